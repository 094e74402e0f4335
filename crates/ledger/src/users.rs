//! User identities referenced by expenses, balances and group rosters.
//!
//! Users are only created here by the import path; everyday provisioning
//! happens through the admin tool.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Identity fields exposed alongside balances and group rosters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Profile {
    pub id: i32,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<Model> for Profile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Best display name for a user: name, then email, then the numeric id.
pub(crate) fn display_name(model: &Model) -> String {
    model
        .name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .or_else(|| model.email.clone())
        .unwrap_or_else(|| format!("user {}", model.id))
}
