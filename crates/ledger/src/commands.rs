//! Command structs for ledger operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};

use crate::{Currency, Money, Share, SplitType};

/// Create an expense (optionally group-scoped).
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub paid_by: i32,
    pub added_by: i32,
    pub name: String,
    pub category: String,
    pub currency: Currency,
    pub amount: Money,
    pub split_type: SplitType,
    pub participants: Vec<Share>,
    pub group_id: Option<i32>,
    pub expense_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
    pub file_key: Option<String>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        paid_by: i32,
        added_by: i32,
        name: impl Into<String>,
        currency: Currency,
        amount: Money,
    ) -> Self {
        Self {
            paid_by,
            added_by,
            name: name.into(),
            category: "general".to_string(),
            currency,
            amount,
            split_type: SplitType::Equal,
            participants: Vec::new(),
            group_id: None,
            expense_date: None,
            transaction_id: None,
            file_key: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn split_type(mut self, split_type: SplitType) -> Self {
        self.split_type = split_type;
        self
    }

    /// Appends one participant share. The payer's own row may be included;
    /// it is stored but never moves balances.
    #[must_use]
    pub fn share(mut self, user_id: i32, amount: Money) -> Self {
        self.participants.push(Share { user_id, amount });
        self
    }

    #[must_use]
    pub fn participants(mut self, participants: Vec<Share>) -> Self {
        self.participants = participants;
        self
    }

    #[must_use]
    pub fn group_id(mut self, group_id: i32) -> Self {
        self.group_id = Some(group_id);
        self
    }

    #[must_use]
    pub fn expense_date(mut self, expense_date: DateTime<Utc>) -> Self {
        self.expense_date = Some(expense_date);
        self
    }

    /// External bank-transaction key used to skip duplicate submissions.
    #[must_use]
    pub fn transaction_id(mut self, key: impl Into<String>) -> Self {
        self.transaction_id = Some(key.into());
        self
    }

    #[must_use]
    pub fn file_key(mut self, key: impl Into<String>) -> Self {
        self.file_key = Some(key.into());
        self
    }
}
