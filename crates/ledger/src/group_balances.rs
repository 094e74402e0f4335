//! Group-scoped mirror of the pairwise balances.
//!
//! Rows repeat the personal deltas keyed by group, so "within this group, who
//! owes whom" can be answered without replaying expenses.

use sea_orm::entity::prelude::*;

use crate::{Currency, LedgerError, Money};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "group_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub currency: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub friend_id: i32,
    pub amount: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One group-scoped balance row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupBalanceEntry {
    pub user_id: i32,
    pub friend_id: i32,
    pub currency: Currency,
    pub amount: Money,
}

impl TryFrom<Model> for GroupBalanceEntry {
    type Error = LedgerError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: model.user_id,
            friend_id: model.friend_id,
            currency: Currency::try_from(model.currency.as_str())?,
            amount: Money::new(model.amount),
        })
    }
}
