//! Expense API endpoints

use api_types::SplitType as ApiSplitType;
use api_types::expense::{ExpenseCreated, ExpenseNew, ExpenseView, ShareView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use ledger::{Currency, Expense, ExpenseCmd, Money, SplitType};
use uuid::Uuid;

use crate::{ServerError, notify, server::ServerState, user};

fn map_split_type(split: SplitType) -> ApiSplitType {
    match split {
        SplitType::Equal => ApiSplitType::Equal,
        SplitType::Percentage => ApiSplitType::Percentage,
        SplitType::Exact => ApiSplitType::Exact,
        SplitType::Share => ApiSplitType::Share,
        SplitType::Adjustment => ApiSplitType::Adjustment,
        SplitType::Settlement => ApiSplitType::Settlement,
    }
}

pub(crate) fn expense_view(expense: Expense) -> Result<ExpenseView, ServerError> {
    let utc = FixedOffset::east_opt(0)
        .ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))?;

    let participants = expense
        .participants
        .iter()
        .map(|share| ShareView {
            user_id: share.user_id,
            amount: share.amount.to_string(),
        })
        .collect();

    Ok(ExpenseView {
        id: expense.id,
        name: expense.name,
        currency: expense.currency.code().to_string(),
        amount: expense.amount.to_string(),
        category: expense.category,
        split_type: map_split_type(expense.split_type),
        paid_by: expense.paid_by,
        added_by: expense.added_by,
        group_id: expense.group_id,
        expense_date: expense.expense_date.with_timezone(&utc),
        transaction_id: expense.transaction_id,
        file_key: expense.file_key,
        deleted: expense.deleted_at.is_some(),
        participants,
    })
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let currency = Currency::try_from(payload.currency.as_str())?;
    let amount: Money = payload.amount.parse()?;
    let paid_by = payload.paid_by.unwrap_or(user.id);

    let mut cmd = ExpenseCmd::new(paid_by, user.id, payload.name, currency, amount);
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(split_type) = payload.split_type {
        cmd = cmd.split_type(SplitType::try_from(split_type.as_str())?);
    }
    for share in payload.participants {
        cmd = cmd.share(share.user_id, share.amount.parse()?);
    }
    if let Some(group_id) = payload.group_id {
        cmd = cmd.group_id(group_id);
    }
    if let Some(expense_date) = payload.expense_date {
        cmd = cmd.expense_date(expense_date.with_timezone(&Utc));
    }
    if let Some(transaction_id) = payload.transaction_id {
        cmd = cmd.transaction_id(transaction_id);
    }
    if let Some(file_key) = payload.file_key {
        cmd = cmd.file_key(file_key);
    }

    let outcome = state.ledger.create_expense(cmd).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let response = ExpenseCreated {
        id: outcome.expense.id,
        created: outcome.created,
    };
    notify::spawn_effects(&state, outcome.effects);

    Ok((status, Json(response)))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    let effects = state.ledger.delete_expense(id, user.id).await?;
    notify::spawn_effects(&state, effects);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_detail(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.ledger.expense_details(id).await?;

    Ok(Json(expense_view(expense)?))
}
