//! Balance API endpoints

use api_types::balance::{BalanceView, FriendView, FriendsResponse, PairBalancesResponse};
use api_types::expense::ExpensesResponse;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use ledger::BalanceAmount;

use crate::{ServerError, expenses, server::ServerState, user};

fn balance_views(balances: Vec<BalanceAmount>) -> Vec<BalanceView> {
    balances
        .into_iter()
        .map(|balance| BalanceView {
            currency: balance.currency.code().to_string(),
            amount: balance.amount.to_string(),
        })
        .collect()
}

pub async fn friends(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<FriendsResponse>, ServerError> {
    let friends = state
        .ledger
        .friend_balances(user.id)
        .await?
        .into_iter()
        .map(|entry| FriendView {
            id: entry.friend.id,
            name: entry.friend.name,
            email: entry.friend.email,
            balances: balance_views(entry.balances),
        })
        .collect();

    Ok(Json(FriendsResponse { friends }))
}

pub async fn with_friend(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(friend_id): Path<i32>,
) -> Result<Json<PairBalancesResponse>, ServerError> {
    let balances = state.ledger.balances_with_friend(user.id, friend_id).await?;

    Ok(Json(PairBalancesResponse {
        friend_id,
        balances: balance_views(balances),
    }))
}

pub async fn expenses_with_friend(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(friend_id): Path<i32>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .ledger
        .expenses_with_friend(user.id, friend_id)
        .await?
        .into_iter()
        .map(expenses::expense_view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(ExpensesResponse { expenses }))
}
