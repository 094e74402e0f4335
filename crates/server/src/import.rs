//! Splitwise import API endpoints

use axum::{Extension, Json, extract::State};
use ledger::{ImportSummary, SplitwiseGroup, SplitwiseUser};

use crate::{ServerError, server::ServerState, user};

pub async fn balances(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<Vec<SplitwiseUser>>,
) -> Result<Json<ImportSummary>, ServerError> {
    let summary = state
        .ledger
        .import_splitwise_balances(user.id, &payload)
        .await?;

    Ok(Json(summary))
}

pub async fn groups(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<Vec<SplitwiseGroup>>,
) -> Result<Json<ImportSummary>, ServerError> {
    let summary = state
        .ledger
        .import_splitwise_groups(user.id, &payload)
        .await?;

    Ok(Json(summary))
}
