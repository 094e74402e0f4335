use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Group, GroupBalanceEntry, GroupOverview, LedgerError, Profile, ResultLedger, group_balances,
    group_users, groups, users,
};

use super::{Ledger, normalize_required_name, with_tx};

impl Ledger {
    /// Creates a group owned by `user_id`; the owner becomes the first
    /// member.
    pub async fn create_group(&self, name: &str, user_id: i32) -> ResultLedger<Group> {
        let name = normalize_required_name(name, "group")?;

        with_tx!(self, |db_tx| {
            let model = groups::ActiveModel {
                public_id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name.clone()),
                user_id: ActiveValue::Set(user_id),
                splitwise_group_id: ActiveValue::Set(None),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            group_users::ActiveModel {
                group_id: ActiveValue::Set(model.id),
                user_id: ActiveValue::Set(user_id),
            }
            .insert(&db_tx)
            .await?;

            Ok(Group::from(model))
        })
    }

    /// Adds `user_id` to the group behind the join token `public_id`.
    /// Joining a group twice is a no-op.
    pub async fn join_group(&self, user_id: i32, public_id: &str) -> ResultLedger<Group> {
        with_tx!(self, |db_tx| {
            let model = groups::Entity::find()
                .filter(groups::Column::PublicId.eq(public_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| LedgerError::NotFound("group not exists".to_string()))?;

            let membership = group_users::ActiveModel {
                group_id: ActiveValue::Set(model.id),
                user_id: ActiveValue::Set(user_id),
            };
            group_users::Entity::insert(membership)
                .on_conflict(
                    OnConflict::columns([
                        group_users::Column::GroupId,
                        group_users::Column::UserId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&db_tx)
                .await?;

            Ok(Group::from(model))
        })
    }

    /// Every group the user belongs to, with roster and group balances.
    pub async fn groups_for_user(&self, user_id: i32) -> ResultLedger<Vec<GroupOverview>> {
        let memberships = group_users::Entity::find()
            .filter(group_users::Column::UserId.eq(user_id))
            .all(&self.database)
            .await?;
        let group_ids: Vec<i32> = memberships
            .into_iter()
            .map(|membership| membership.group_id)
            .collect();
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let group_models = groups::Entity::find()
            .filter(groups::Column::Id.is_in(group_ids.iter().copied()))
            .order_by_asc(groups::Column::Id)
            .all(&self.database)
            .await?;
        let member_rows = group_users::Entity::find()
            .filter(group_users::Column::GroupId.is_in(group_ids.iter().copied()))
            .order_by_asc(group_users::Column::UserId)
            .all(&self.database)
            .await?;
        let balance_rows = group_balances::Entity::find()
            .filter(group_balances::Column::GroupId.is_in(group_ids.iter().copied()))
            .all(&self.database)
            .await?;

        let member_ids: BTreeSet<i32> = member_rows.iter().map(|row| row.user_id).collect();
        let user_models = users::Entity::find()
            .filter(users::Column::Id.is_in(member_ids.iter().copied()))
            .all(&self.database)
            .await?;
        let profiles: HashMap<i32, Profile> = user_models
            .into_iter()
            .map(|model| (model.id, Profile::from(model)))
            .collect();

        let mut out = Vec::with_capacity(group_models.len());
        for model in group_models {
            let members: Vec<Profile> = member_rows
                .iter()
                .filter(|row| row.group_id == model.id)
                .filter_map(|row| profiles.get(&row.user_id).cloned())
                .collect();
            let balances = balance_rows
                .iter()
                .filter(|row| row.group_id == model.id)
                .cloned()
                .map(GroupBalanceEntry::try_from)
                .collect::<ResultLedger<Vec<_>>>()?;
            out.push(GroupOverview {
                group: Group::from(model),
                members,
                balances,
            });
        }
        Ok(out)
    }
}
