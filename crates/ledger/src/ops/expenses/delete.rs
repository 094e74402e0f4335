use chrono::Utc;
use uuid::Uuid;

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};

use crate::{Currency, Effect, LedgerError, ResultLedger, expense_participants, expenses};

use super::super::{Ledger, with_tx};

impl Ledger {
    /// Soft-deletes an expense and reverses its balance deltas.
    ///
    /// Each stored non-payer share is applied back with the opposite sign, so
    /// the pair balances return bit-exact to their pre-creation values. The
    /// row keeps its history fields; the external dedup key is cleared so the
    /// same bank transaction can be imported again later.
    ///
    /// Deleting an already-deleted expense is `NotFound`.
    pub async fn delete_expense(
        &self,
        expense_id: Uuid,
        deleted_by: i32,
    ) -> ResultLedger<Vec<Effect>> {
        with_tx!(self, |db_tx| {
            let model = expenses::Entity::find_by_id(expense_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))?;
            if model.deleted_at.is_some() {
                return Err(LedgerError::NotFound("expense not exists".to_string()));
            }
            let currency = Currency::try_from(model.currency.as_str())?;

            let share_rows = expense_participants::Entity::find()
                .filter(expense_participants::Column::ExpenseId.eq(expense_id.to_string()))
                .all(&db_tx)
                .await?;

            for row in &share_rows {
                if row.user_id == model.paid_by {
                    continue;
                }
                // Exact negation of the creation delta, read from storage.
                self.bump_pair(&db_tx, model.paid_by, row.user_id, &currency, row.amount, false)
                    .await?;
                if let Some(group_id) = model.group_id {
                    self.bump_group_pair(
                        &db_tx,
                        group_id,
                        model.paid_by,
                        row.user_id,
                        &currency,
                        row.amount,
                    )
                    .await?;
                }
            }

            let update = expenses::ActiveModel {
                id: ActiveValue::Set(expense_id.to_string()),
                transaction_id: ActiveValue::Set(None),
                deleted_at: ActiveValue::Set(Some(Utc::now())),
                deleted_by: ActiveValue::Set(Some(deleted_by)),
                ..Default::default()
            };
            update.update(&db_tx).await?;

            Ok(vec![Effect::NotifyExpense { expense_id }])
        })
    }
}
