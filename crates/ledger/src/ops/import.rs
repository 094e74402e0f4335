use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    Currency, ImportSummary, Money, ResultLedger, SplitwiseGroup, SplitwiseUser, balances,
    group_users, groups, users,
};

use super::{Ledger, normalize_email, with_tx};

struct BalanceLine {
    email: Option<String>,
    currency: Currency,
    amount: Money,
}

impl Ledger {
    /// Folds an external balance snapshot into the personal ledger.
    ///
    /// Counterparties are resolved by normalized email, created when unknown.
    /// Each balance line lands at most once: the pair row is stamped
    /// `imported_from_splitwise` on first application and skipped ever after,
    /// so replaying the same snapshot is a no-op. Lines without a resolvable
    /// counterparty, and lines pointing at the importing user, are counted as
    /// skipped.
    ///
    /// Every line is validated before the first write; one malformed amount
    /// or currency fails the whole import with nothing applied.
    pub async fn import_splitwise_balances(
        &self,
        user_id: i32,
        friends: &[SplitwiseUser],
    ) -> ResultLedger<ImportSummary> {
        let mut lines = Vec::new();
        for friend in friends {
            let email = normalize_email(&friend.email);
            for line in &friend.balance {
                lines.push(BalanceLine {
                    email: email.clone(),
                    currency: Currency::try_from(line.currency_code.as_str())?,
                    amount: line.amount.parse()?,
                });
            }
        }

        with_tx!(self, |db_tx| {
            let (ids_by_email, users_created) =
                self.ensure_users_by_email(&db_tx, friends).await?;

            let mut summary = ImportSummary {
                users_created,
                ..ImportSummary::default()
            };
            for line in &lines {
                let friend_id = line
                    .email
                    .as_ref()
                    .and_then(|email| ids_by_email.get(email).copied());
                let Some(friend_id) = friend_id else {
                    summary.balances_skipped += 1;
                    continue;
                };
                if friend_id == user_id {
                    // A snapshot can contain the importing user; a balance
                    // against oneself is meaningless.
                    summary.balances_skipped += 1;
                    continue;
                }

                let existing = balances::Entity::find_by_id((
                    user_id,
                    line.currency.code().to_string(),
                    friend_id,
                ))
                .one(&db_tx)
                .await?;
                if existing.is_some_and(|row| row.imported_from_splitwise) {
                    summary.balances_skipped += 1;
                    continue;
                }

                self.bump_pair(
                    &db_tx,
                    user_id,
                    friend_id,
                    &line.currency,
                    line.amount.minor_units(),
                    true,
                )
                .await?;
                summary.balances_applied += 1;
            }

            tracing::debug!(
                user_id,
                applied = summary.balances_applied,
                skipped = summary.balances_skipped,
                "splitwise balance import finished"
            );
            Ok(summary)
        })
    }

    /// Creates groups from an external snapshot.
    ///
    /// A group whose external id was imported before is skipped wholesale.
    /// Members resolve through the same email path as the balance import;
    /// members without an email are left off the roster.
    pub async fn import_splitwise_groups(
        &self,
        user_id: i32,
        imported: &[SplitwiseGroup],
    ) -> ResultLedger<ImportSummary> {
        let members: Vec<SplitwiseUser> = imported
            .iter()
            .flat_map(|group| group.members.iter().cloned())
            .collect();

        with_tx!(self, |db_tx| {
            let (ids_by_email, users_created) =
                self.ensure_users_by_email(&db_tx, &members).await?;

            let mut summary = ImportSummary {
                users_created,
                ..ImportSummary::default()
            };
            for group in imported {
                let external_id = group.id.to_string();
                let existing = groups::Entity::find()
                    .filter(groups::Column::SplitwiseGroupId.eq(external_id.clone()))
                    .one(&db_tx)
                    .await?;
                if existing.is_some() {
                    summary.groups_skipped += 1;
                    continue;
                }

                let model = groups::ActiveModel {
                    public_id: ActiveValue::Set(Uuid::new_v4().to_string()),
                    name: ActiveValue::Set(group.name.trim().to_string()),
                    user_id: ActiveValue::Set(user_id),
                    splitwise_group_id: ActiveValue::Set(Some(external_id)),
                    ..Default::default()
                }
                .insert(&db_tx)
                .await?;

                let member_ids: BTreeSet<i32> = group
                    .members
                    .iter()
                    .filter_map(|member| normalize_email(&member.email))
                    .filter_map(|email| ids_by_email.get(&email).copied())
                    .collect();
                let roster: Vec<group_users::ActiveModel> = member_ids
                    .into_iter()
                    .map(|member_id| group_users::ActiveModel {
                        group_id: ActiveValue::Set(model.id),
                        user_id: ActiveValue::Set(member_id),
                    })
                    .collect();
                if !roster.is_empty() {
                    group_users::Entity::insert_many(roster)
                        .exec_without_returning(&db_tx)
                        .await?;
                }
                summary.groups_created += 1;
            }
            Ok(summary)
        })
    }

    /// Resolves external users to local ids by normalized email, creating the
    /// missing ones. Returns the id map and how many users were created.
    async fn ensure_users_by_email(
        &self,
        db_tx: &DatabaseTransaction,
        external: &[SplitwiseUser],
    ) -> ResultLedger<(HashMap<String, i32>, u32)> {
        let mut names_by_email: HashMap<String, String> = HashMap::new();
        for user in external {
            if let Some(email) = normalize_email(&user.email) {
                names_by_email
                    .entry(email)
                    .or_insert_with(|| user.display_name());
            }
        }
        if names_by_email.is_empty() {
            return Ok((HashMap::new(), 0));
        }

        let emails: Vec<String> = names_by_email.keys().cloned().collect();
        let existing = users::Entity::find()
            .filter(users::Column::Email.is_in(emails.clone()))
            .all(db_tx)
            .await?;
        let mut ids_by_email: HashMap<String, i32> = existing
            .into_iter()
            .filter_map(|model| {
                let id = model.id;
                model.email.map(|email| (email, id))
            })
            .collect();

        let missing: Vec<users::ActiveModel> = names_by_email
            .iter()
            .filter(|(email, _)| !ids_by_email.contains_key(*email))
            .map(|(email, name)| users::ActiveModel {
                name: ActiveValue::Set(Some(name.clone())),
                email: ActiveValue::Set(Some(email.clone())),
                ..Default::default()
            })
            .collect();
        let users_created = missing.len() as u32;
        if !missing.is_empty() {
            users::Entity::insert_many(missing)
                .exec_without_returning(db_tx)
                .await?;
            let resolved = users::Entity::find()
                .filter(users::Column::Email.is_in(emails))
                .all(db_tx)
                .await?;
            ids_by_email = resolved
                .into_iter()
                .filter_map(|model| {
                    let id = model.id;
                    model.email.map(|email| (email, id))
                })
                .collect();
        }

        Ok((ids_by_email, users_created))
    }
}
