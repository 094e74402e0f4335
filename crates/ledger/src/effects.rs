//! Deferred side effects of committed writes.
//!
//! Write operations return their follow-up work as data instead of running it
//! inline. The caller executes the effects after the transaction committed
//! (usually on a background task); a failing effect never makes a committed
//! write look failed.

use uuid::Uuid;

use crate::Currency;

/// Follow-up work produced by a committed ledger write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Zero the group-scoped rows of every listed pair whose personal
    /// balance is exactly zero in `currency`.
    ReconcileZeroBalances {
        user_id: i32,
        friend_ids: Vec<i32>,
        currency: Currency,
    },
    /// Push-notify the other participants of a created or deleted expense.
    NotifyExpense { expense_id: Uuid },
}

/// Title/message pair handed to the notification transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushPayload {
    pub title: String,
    pub message: String,
}

/// Transport that delivers push payloads to a user's devices.
///
/// Delivery is fire-and-forget: failures are logged per recipient and never
/// retried.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn deliver(
        &self,
        user_id: i32,
        payload: &PushPayload,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
