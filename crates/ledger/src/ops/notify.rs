use uuid::Uuid;

use sea_orm::{QueryFilter, prelude::*};

use crate::{
    Currency, Effect, LedgerError, Money, NotificationDispatcher, PushPayload, ResultLedger,
    SplitType, expense_participants, expenses, users,
};

use super::Ledger;

impl Ledger {
    /// Runs the deferred effects of a committed write.
    ///
    /// Failures are logged and swallowed: by the time effects run the write
    /// has committed, and nothing here may make it look failed.
    pub async fn apply_effects(
        &self,
        effects: &[Effect],
        dispatcher: &dyn NotificationDispatcher,
    ) {
        for effect in effects {
            if let Err(err) = self.apply_effect(effect, dispatcher).await {
                tracing::warn!("deferred effect failed: {err}");
            }
        }
    }

    async fn apply_effect(
        &self,
        effect: &Effect,
        dispatcher: &dyn NotificationDispatcher,
    ) -> ResultLedger<()> {
        match effect {
            Effect::ReconcileZeroBalances {
                user_id,
                friend_ids,
                currency,
            } => {
                self.reconcile_zero_balances(*user_id, friend_ids, currency)
                    .await?;
            }
            Effect::NotifyExpense { expense_id } => {
                self.notify_expense_participants(*expense_id, dispatcher)
                    .await?;
            }
        }
        Ok(())
    }

    /// Builds the push payload for an expense and delivers it to every stored
    /// participant except the acting user (the deleter for deletions, the
    /// creator otherwise).
    pub async fn notify_expense_participants(
        &self,
        expense_id: Uuid,
        dispatcher: &dyn NotificationDispatcher,
    ) -> ResultLedger<()> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| LedgerError::NotFound("expense not exists".to_string()))?;
        let share_rows = expense_participants::Entity::find()
            .filter(expense_participants::Column::ExpenseId.eq(expense_id.to_string()))
            .all(&self.database)
            .await?;

        let actor_id = model.deleted_by.unwrap_or(model.added_by);
        let recipients: Vec<i32> = share_rows
            .iter()
            .map(|row| row.user_id)
            .filter(|id| *id != actor_id)
            .collect();
        if recipients.is_empty() {
            return Ok(());
        }

        let user_models = users::Entity::find()
            .filter(users::Column::Id.is_in([actor_id, model.paid_by]))
            .all(&self.database)
            .await?;
        let name_of = |id: i32| {
            user_models
                .iter()
                .find(|user| user.id == id)
                .map(users::display_name)
                .unwrap_or_else(|| format!("user {id}"))
        };

        let payload = push_payload(&model, &name_of(actor_id), &name_of(model.paid_by))?;
        for recipient in recipients {
            if let Err(err) = dispatcher.deliver(recipient, &payload).await {
                tracing::warn!("push delivery to user {recipient} failed: {err}");
            }
        }
        Ok(())
    }
}

/// Wording rules for expense notifications. The title is always the acting
/// user's display name.
fn push_payload(expense: &expenses::Model, actor: &str, payer: &str) -> ResultLedger<PushPayload> {
    let currency = Currency::try_from(expense.currency.as_str())?;
    let amount = Money::new(expense.amount);

    let message = if expense.deleted_by.is_some() {
        format!("Deleted {}", expense.name)
    } else if SplitType::try_from(expense.split_type.as_str())? == SplitType::Settlement {
        format!("{payer} settled up {} {amount}", currency.code())
    } else {
        format!("{payer} paid {} {amount} for {}", currency.code(), expense.name)
    };

    Ok(PushPayload {
        title: actor.to_string(),
        message,
    })
}
