use chrono::Utc;
use uuid::Uuid;

use crate::{Expense, ExpenseCmd, LedgerError, ResultLedger};

use super::normalize_required_name;

mod create;
mod delete;
mod list;

/// Validates a creation command and freezes it into a persistable expense.
fn build_expense(cmd: &ExpenseCmd) -> ResultLedger<Expense> {
    if cmd.amount.is_negative() {
        return Err(LedgerError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }
    let name = normalize_required_name(&cmd.name, "expense")?;

    let now = Utc::now();
    Ok(Expense {
        id: Uuid::new_v4(),
        group_id: cmd.group_id,
        paid_by: cmd.paid_by,
        added_by: cmd.added_by,
        name,
        category: cmd.category.trim().to_string(),
        currency: cmd.currency.clone(),
        amount: cmd.amount,
        split_type: cmd.split_type,
        expense_date: cmd.expense_date.unwrap_or(now),
        created_at: now,
        transaction_id: cmd.transaction_id.clone(),
        file_key: cmd.file_key.clone(),
        imported: cmd.transaction_id.is_some(),
        deleted_at: None,
        deleted_by: None,
        participants: cmd.participants.clone(),
    })
}
