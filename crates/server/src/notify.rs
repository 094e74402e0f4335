//! Delivery of the effects a committed write left behind.

use std::sync::Arc;

use ledger::{Effect, NotificationDispatcher, PushPayload};

use crate::server::ServerState;

/// Dispatcher used until a real push provider is wired in.
///
/// Deliveries are written to the log and always succeed.
pub struct LogDispatcher;

#[async_trait::async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn deliver(
        &self,
        user_id: i32,
        payload: &PushPayload,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            "push to user {user_id}: {}: {}",
            payload.title,
            payload.message
        );
        Ok(())
    }
}

/// Runs the deferred effects of a write on a background task, after the
/// response is already on its way.
pub(crate) fn spawn_effects(state: &ServerState, effects: Vec<Effect>) {
    if effects.is_empty() {
        return;
    }

    let ledger = Arc::clone(&state.ledger);
    let dispatcher = Arc::clone(&state.dispatcher);
    tokio::spawn(async move {
        ledger.apply_effects(&effects, dispatcher.as_ref()).await;
    });
}
