//! Pairwise balance rows: who owes whom, per currency.
//!
//! `(user_id, currency, friend_id)` is the key; `amount` is the signed minor
//! units the friend owes the user. Every committed write keeps the mirrored
//! row `(friend_id, currency, user_id)` at the exact negation.

use sea_orm::entity::prelude::*;

use crate::{Currency, LedgerError, Money, Profile};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub currency: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub friend_id: i32,
    pub amount: i64,
    /// Gate for the one-shot Splitwise import: a row carrying this flag is
    /// never imported into again.
    pub imported_from_splitwise: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// One currency's signed balance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BalanceAmount {
    pub currency: Currency,
    pub amount: Money,
}

impl TryFrom<Model> for BalanceAmount {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            currency: Currency::try_from(model.currency.as_str())?,
            amount: Money::new(model.amount),
        })
    }
}

/// A counterparty with their nonzero per-currency balances.
#[derive(Clone, Debug)]
pub struct FriendBalances {
    pub friend: Profile,
    pub balances: Vec<BalanceAmount>,
}
