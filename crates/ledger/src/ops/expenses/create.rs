use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Effect, Expense, ExpenseCmd, ExpenseOutcome, LedgerError, ResultLedger, expense_participants,
    expenses, groups,
};

use super::super::{Ledger, with_tx};
use super::build_expense;

impl Ledger {
    /// Creates an expense and applies its balance deltas in one transaction.
    ///
    /// For every non-payer participant with signed share `s`, the payer's
    /// balance toward them moves by `-s` and the mirrored row by `+s`; a
    /// group expense repeats the same deltas against the group ledger. The
    /// payer's own share row is stored but never moves balances.
    ///
    /// Submitting an already-stored external `transaction_id` again is not an
    /// error: the stored expense comes back with `created: false`, nothing is
    /// written and no effects are produced.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultLedger<ExpenseOutcome> {
        let expense = build_expense(&cmd)?;

        match self.persist_expense(&expense).await {
            Ok(()) => {
                let friend_ids: Vec<i32> = expense
                    .participants
                    .iter()
                    .map(|share| share.user_id)
                    .filter(|user_id| *user_id != expense.paid_by)
                    .collect();
                let effects = vec![
                    Effect::ReconcileZeroBalances {
                        user_id: expense.paid_by,
                        friend_ids,
                        currency: expense.currency.clone(),
                    },
                    Effect::NotifyExpense {
                        expense_id: expense.id,
                    },
                ];
                Ok(ExpenseOutcome {
                    expense,
                    created: true,
                    effects,
                })
            }
            Err(LedgerError::Database(db_err))
                if matches!(db_err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                // A unique violation only means "duplicate submission" when the
                // command carried a dedup key and a live expense holds it.
                let Some(key) = cmd.transaction_id.as_deref() else {
                    return Err(LedgerError::Conflict(db_err.to_string()));
                };
                match self.find_live_expense_by_key(key).await? {
                    Some(expense_id) => Ok(ExpenseOutcome {
                        expense: self.expense_details(expense_id).await?,
                        created: false,
                        effects: Vec::new(),
                    }),
                    None => Err(LedgerError::Conflict(db_err.to_string())),
                }
            }
            Err(LedgerError::Database(db_err))
                if matches!(
                    db_err.sql_err(),
                    Some(SqlErr::ForeignKeyConstraintViolation(_))
                ) =>
            {
                // Typically a payer or participant id no user carries.
                Err(LedgerError::Conflict(db_err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    /// Runs the whole creation (expense row, share rows, balance deltas) as
    /// one transaction; any failure rolls everything back.
    async fn persist_expense(&self, expense: &Expense) -> ResultLedger<()> {
        with_tx!(self, |db_tx| {
            self.write_expense_rows(&db_tx, expense).await?;
            Ok(())
        })
    }

    async fn write_expense_rows(
        &self,
        db_tx: &DatabaseTransaction,
        expense: &Expense,
    ) -> ResultLedger<()> {
        if let Some(group_id) = expense.group_id {
            groups::Entity::find_by_id(group_id)
                .one(db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("group not exists".to_string()))?;
        }

        expenses::ActiveModel::from(expense).insert(db_tx).await?;

        let share_rows: Vec<expense_participants::ActiveModel> = expense
            .participants
            .iter()
            .map(|share| expense_participants::ActiveModel {
                expense_id: ActiveValue::Set(expense.id.to_string()),
                user_id: ActiveValue::Set(share.user_id),
                amount: ActiveValue::Set(share.amount.minor_units()),
            })
            .collect();
        if !share_rows.is_empty() {
            expense_participants::Entity::insert_many(share_rows)
                .exec_without_returning(db_tx)
                .await?;
        }

        for share in &expense.participants {
            if share.user_id == expense.paid_by {
                continue;
            }
            let delta = share.amount.minor_units();
            self.bump_pair(
                db_tx,
                expense.paid_by,
                share.user_id,
                &expense.currency,
                -delta,
                false,
            )
            .await?;
            if let Some(group_id) = expense.group_id {
                self.bump_group_pair(
                    db_tx,
                    group_id,
                    expense.paid_by,
                    share.user_id,
                    &expense.currency,
                    -delta,
                )
                .await?;
            }
        }

        Ok(())
    }

    async fn find_live_expense_by_key(&self, key: &str) -> ResultLedger<Option<Uuid>> {
        let model = expenses::Entity::find()
            .filter(expenses::Column::TransactionId.eq(key))
            .filter(expenses::Column::DeletedAt.is_null())
            .one(&self.database)
            .await?;

        match model {
            Some(model) => Ok(Some(Expense::try_from(model)?.id)),
            None => Ok(None),
        }
    }
}
