//! Group API endpoints

use api_types::group::{
    GroupBalanceView, GroupCreated, GroupJoin, GroupNew, GroupView, GroupsResponse, MemberView,
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use ledger::Group;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn group_created(group: Group) -> Result<GroupCreated, ServerError> {
    let public_id =
        Uuid::parse_str(&group.public_id).map_err(|err| ServerError::Generic(err.to_string()))?;

    Ok(GroupCreated {
        id: group.id,
        public_id,
        name: group.name,
    })
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupNew>,
) -> Result<(StatusCode, Json<GroupCreated>), ServerError> {
    let group = state.ledger.create_group(&payload.name, user.id).await?;

    Ok((StatusCode::CREATED, Json(group_created(group)?)))
}

pub async fn join(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GroupJoin>,
) -> Result<Json<GroupCreated>, ServerError> {
    let group = state
        .ledger
        .join_group(user.id, &payload.public_id.to_string())
        .await?;

    Ok(Json(group_created(group)?))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<GroupsResponse>, ServerError> {
    let groups = state
        .ledger
        .groups_for_user(user.id)
        .await?
        .into_iter()
        .map(|overview| {
            let public_id = Uuid::parse_str(&overview.group.public_id)
                .map_err(|err| ServerError::Generic(err.to_string()))?;
            let members = overview
                .members
                .into_iter()
                .map(|member| MemberView {
                    id: member.id,
                    name: member.name,
                    email: member.email,
                })
                .collect();
            let balances = overview
                .balances
                .into_iter()
                .map(|entry| GroupBalanceView {
                    user_id: entry.user_id,
                    friend_id: entry.friend_id,
                    currency: entry.currency.code().to_string(),
                    amount: entry.amount.to_string(),
                })
                .collect();

            Ok(GroupView {
                id: overview.group.id,
                public_id,
                name: overview.group.name,
                members,
                balances,
            })
        })
        .collect::<Result<Vec<_>, ServerError>>()?;

    Ok(Json(GroupsResponse { groups }))
}
