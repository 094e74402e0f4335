use uuid::Uuid;

use sea_orm::{Condition, JoinType, QueryFilter, QueryOrder, QuerySelect, prelude::*};

use crate::{
    Expense, LedgerError, Money, ResultLedger, Share, expense_participants, expenses,
};

use super::super::Ledger;

impl Ledger {
    /// One expense with its stored shares. Deleted expenses are returned too;
    /// callers can tell from `deleted_at`.
    pub async fn expense_details(&self, expense_id: Uuid) -> ResultLedger<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))?;
        let share_rows = expense_participants::Entity::find()
            .filter(expense_participants::Column::ExpenseId.eq(expense_id.to_string()))
            .order_by_asc(expense_participants::Column::UserId)
            .all(&self.database)
            .await?;

        let mut expense = Expense::try_from(model)?;
        expense.participants = share_rows
            .into_iter()
            .map(|row| Share {
                user_id: row.user_id,
                amount: Money::new(row.amount),
            })
            .collect();
        Ok(expense)
    }

    /// Non-deleted expenses involving both users (one paid, the other holds a
    /// share), newest first. Shares are not loaded here.
    pub async fn expenses_with_friend(
        &self,
        user_id: i32,
        friend_id: i32,
    ) -> ResultLedger<Vec<Expense>> {
        let rows = expenses::Entity::find()
            .join(JoinType::InnerJoin, expenses::Relation::Participants.def())
            .filter(expenses::Column::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(expenses::Column::PaidBy.eq(user_id))
                            .add(expense_participants::Column::UserId.eq(friend_id)),
                    )
                    .add(
                        Condition::all()
                            .add(expenses::Column::PaidBy.eq(friend_id))
                            .add(expense_participants::Column::UserId.eq(user_id)),
                    ),
            )
            .order_by_desc(expenses::Column::ExpenseDate)
            .all(&self.database)
            .await?;

        rows.into_iter().map(Expense::try_from).collect()
    }
}
