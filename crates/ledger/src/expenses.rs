//! Expense primitives.
//!
//! An `Expense` is an atomic monetary event that moves pairwise balances via
//! its per-participant `Share`s. Deletion is a soft-delete that reverses the
//! shares; the row itself stays for history.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, Effect, LedgerError, Money};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equal,
    Percentage,
    Exact,
    Share,
    Adjustment,
    Settlement,
}

impl SplitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Percentage => "percentage",
            Self::Exact => "exact",
            Self::Share => "share",
            Self::Adjustment => "adjustment",
            Self::Settlement => "settlement",
        }
    }
}

impl TryFrom<&str> for SplitType {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "equal" => Ok(Self::Equal),
            "percentage" => Ok(Self::Percentage),
            "exact" => Ok(Self::Exact),
            "share" => Ok(Self::Share),
            "adjustment" => Ok(Self::Adjustment),
            "settlement" => Ok(Self::Settlement),
            other => Err(LedgerError::InvalidSplit(other.to_string())),
        }
    }
}

/// A participant's signed share of an expense, relative to the payer.
///
/// Negative means the participant owes the payer that much; the payer's own
/// row (when present) is bookkeeping only and never moves balances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub user_id: i32,
    pub amount: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub group_id: Option<i32>,
    pub paid_by: i32,
    pub added_by: i32,
    pub name: String,
    pub category: String,
    pub currency: Currency,
    pub amount: Money,
    pub split_type: SplitType,
    pub expense_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// External bank-transaction key; unique among live expenses.
    pub transaction_id: Option<String>,
    /// Storage key of an attached receipt, if any.
    pub file_key: Option<String>,
    /// Set when the expense entered through an external import.
    pub imported: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i32>,
    pub participants: Vec<Share>,
}

/// Result of an expense creation.
#[derive(Clone, Debug)]
pub struct ExpenseOutcome {
    pub expense: Expense,
    /// `false` when the external transaction key was already stored and the
    /// existing expense is returned instead.
    pub created: bool,
    /// Deferred follow-ups to run after the commit.
    pub effects: Vec<Effect>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub group_id: Option<i32>,
    pub paid_by: i32,
    pub added_by: i32,
    pub name: String,
    pub category: String,
    pub currency: String,
    pub amount: i64,
    pub split_type: String,
    pub expense_date: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub transaction_id: Option<String>,
    pub file_key: Option<String>,
    pub imported: bool,
    pub deleted_at: Option<DateTimeUtc>,
    pub deleted_by: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_participants::Entity")]
    Participants,
}

impl Related<super::expense_participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(expense: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(expense.id.to_string()),
            group_id: ActiveValue::Set(expense.group_id),
            paid_by: ActiveValue::Set(expense.paid_by),
            added_by: ActiveValue::Set(expense.added_by),
            name: ActiveValue::Set(expense.name.clone()),
            category: ActiveValue::Set(expense.category.clone()),
            currency: ActiveValue::Set(expense.currency.code().to_string()),
            amount: ActiveValue::Set(expense.amount.minor_units()),
            split_type: ActiveValue::Set(expense.split_type.as_str().to_string()),
            expense_date: ActiveValue::Set(expense.expense_date),
            created_at: ActiveValue::Set(expense.created_at),
            transaction_id: ActiveValue::Set(expense.transaction_id.clone()),
            file_key: ActiveValue::Set(expense.file_key.clone()),
            imported: ActiveValue::Set(expense.imported),
            deleted_at: ActiveValue::Set(expense.deleted_at),
            deleted_by: ActiveValue::Set(expense.deleted_by),
        }
    }
}

impl TryFrom<Model> for Expense {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| LedgerError::NotFound("expense not exists".to_string()))?,
            group_id: model.group_id,
            paid_by: model.paid_by,
            added_by: model.added_by,
            name: model.name,
            category: model.category,
            currency: Currency::try_from(model.currency.as_str())?,
            amount: Money::new(model.amount),
            split_type: SplitType::try_from(model.split_type.as_str())?,
            expense_date: model.expense_date,
            created_at: model.created_at,
            transaction_id: model.transaction_id,
            file_key: model.file_key,
            imported: model.imported,
            deleted_at: model.deleted_at,
            deleted_by: model.deleted_by,
            participants: Vec::new(),
        })
    }
}
