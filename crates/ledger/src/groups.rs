//! Expense groups.
//!
//! A group is a named circle of users; expenses booked into it additionally
//! move the group-scoped balance mirror.

use sea_orm::entity::prelude::*;

use crate::{GroupBalanceEntry, Profile};

/// A group as seen by callers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub id: i32,
    /// Opaque join token shared out-of-band ("join my group").
    pub public_id: String,
    pub name: String,
    /// The user who created (or imported) the group.
    pub user_id: i32,
    /// External id when the group came from a Splitwise import.
    pub splitwise_group_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub public_id: String,
    pub name: String,
    pub user_id: i32,
    pub splitwise_group_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::group_users::Entity")]
    Members,
}

impl Related<super::group_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Group {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            public_id: model.public_id,
            name: model.name,
            user_id: model.user_id,
            splitwise_group_id: model.splitwise_group_id,
        }
    }
}

/// A group together with its roster and group-scoped balance rows.
#[derive(Clone, Debug)]
pub struct GroupOverview {
    pub group: Group,
    pub members: Vec<Profile>,
    pub balances: Vec<GroupBalanceEntry>,
}
