use std::collections::{BTreeMap, HashMap};

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};

use crate::{
    BalanceAmount, Currency, FriendBalances, Profile, ResultLedger, balances, group_balances,
    users,
};

use super::Ledger;

impl Ledger {
    /// Adds `delta` to `Balance(user_id, currency, friend_id)`, creating the
    /// row when missing.
    ///
    /// The increment happens in SQL (`amount = amount + delta`) so concurrent
    /// writers compose instead of overwriting each other's reads.
    pub(super) async fn bump_balance(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        friend_id: i32,
        currency: &Currency,
        delta: i64,
        mark_imported: bool,
    ) -> ResultLedger<()> {
        let mut on_conflict = OnConflict::columns([
            balances::Column::UserId,
            balances::Column::Currency,
            balances::Column::FriendId,
        ]);
        on_conflict.value(
            balances::Column::Amount,
            Expr::col(balances::Column::Amount).add(delta),
        );
        if mark_imported {
            on_conflict.value(balances::Column::ImportedFromSplitwise, Expr::value(true));
        }

        let row = balances::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            currency: ActiveValue::Set(currency.code().to_string()),
            friend_id: ActiveValue::Set(friend_id),
            amount: ActiveValue::Set(delta),
            imported_from_splitwise: ActiveValue::Set(mark_imported),
        };
        balances::Entity::insert(row)
            .on_conflict(on_conflict)
            .exec_without_returning(db_tx)
            .await?;

        Ok(())
    }

    /// Applies a mirrored pair update: `+delta` on the user's row toward the
    /// friend, `-delta` on the friend's row back. Antisymmetry holds as long
    /// as every write goes through here.
    pub(super) async fn bump_pair(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: i32,
        friend_id: i32,
        currency: &Currency,
        delta: i64,
        mark_imported: bool,
    ) -> ResultLedger<()> {
        self.bump_balance(db_tx, user_id, friend_id, currency, delta, mark_imported)
            .await?;
        self.bump_balance(db_tx, friend_id, user_id, currency, -delta, mark_imported)
            .await?;
        Ok(())
    }

    async fn bump_group_balance(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: i32,
        user_id: i32,
        friend_id: i32,
        currency: &Currency,
        delta: i64,
    ) -> ResultLedger<()> {
        let mut on_conflict = OnConflict::columns([
            group_balances::Column::GroupId,
            group_balances::Column::Currency,
            group_balances::Column::UserId,
            group_balances::Column::FriendId,
        ]);
        on_conflict.value(
            group_balances::Column::Amount,
            Expr::col(group_balances::Column::Amount).add(delta),
        );

        let row = group_balances::ActiveModel {
            group_id: ActiveValue::Set(group_id),
            currency: ActiveValue::Set(currency.code().to_string()),
            user_id: ActiveValue::Set(user_id),
            friend_id: ActiveValue::Set(friend_id),
            amount: ActiveValue::Set(delta),
        };
        group_balances::Entity::insert(row)
            .on_conflict(on_conflict)
            .exec_without_returning(db_tx)
            .await?;

        Ok(())
    }

    /// The same mirrored update against the group-scoped ledger.
    pub(super) async fn bump_group_pair(
        &self,
        db_tx: &DatabaseTransaction,
        group_id: i32,
        user_id: i32,
        friend_id: i32,
        currency: &Currency,
        delta: i64,
    ) -> ResultLedger<()> {
        self.bump_group_balance(db_tx, group_id, user_id, friend_id, currency, delta)
            .await?;
        self.bump_group_balance(db_tx, group_id, friend_id, user_id, currency, -delta)
            .await?;
        Ok(())
    }

    /// Zeroes the group-scoped rows of every listed pair whose personal
    /// balance with `user_id` is exactly zero in `currency`.
    ///
    /// Pairs that still owe each other are left alone, whatever their group
    /// rows say. Returns the number of zeroed group rows.
    pub async fn reconcile_zero_balances(
        &self,
        user_id: i32,
        friend_ids: &[i32],
        currency: &Currency,
    ) -> ResultLedger<u64> {
        if friend_ids.is_empty() {
            return Ok(0);
        }

        let rows = balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .filter(balances::Column::Currency.eq(currency.code()))
            .filter(balances::Column::FriendId.is_in(friend_ids.iter().copied()))
            .all(&self.database)
            .await?;
        let zeroed: Vec<i32> = rows
            .into_iter()
            .filter(|row| row.amount == 0)
            .map(|row| row.friend_id)
            .collect();
        if zeroed.is_empty() {
            return Ok(0);
        }

        let result = group_balances::Entity::update_many()
            .col_expr(group_balances::Column::Amount, Expr::value(0i64))
            .filter(group_balances::Column::Currency.eq(currency.code()))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(group_balances::Column::UserId.eq(user_id))
                            .add(group_balances::Column::FriendId.is_in(zeroed.iter().copied())),
                    )
                    .add(
                        Condition::all()
                            .add(group_balances::Column::UserId.is_in(zeroed.iter().copied()))
                            .add(group_balances::Column::FriendId.eq(user_id)),
                    ),
            )
            .exec(&self.database)
            .await?;

        tracing::debug!(
            user_id,
            pairs = zeroed.len(),
            rows = result.rows_affected,
            "group balances reconciled to zero"
        );
        Ok(result.rows_affected)
    }

    /// Every counterparty of the user, with their nonzero per-currency
    /// balances. Counterparties whose balances all returned to zero are still
    /// listed, with an empty balance list.
    pub async fn friend_balances(&self, user_id: i32) -> ResultLedger<Vec<FriendBalances>> {
        let rows = balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .order_by_asc(balances::Column::FriendId)
            .order_by_asc(balances::Column::Currency)
            .all(&self.database)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut by_friend: BTreeMap<i32, Vec<BalanceAmount>> = BTreeMap::new();
        for row in rows {
            let friend_id = row.friend_id;
            let entry = by_friend.entry(friend_id).or_default();
            if row.amount != 0 {
                entry.push(BalanceAmount::try_from(row)?);
            }
        }

        let friend_models = users::Entity::find()
            .filter(users::Column::Id.is_in(by_friend.keys().copied().collect::<Vec<_>>()))
            .all(&self.database)
            .await?;
        let profiles: HashMap<i32, Profile> = friend_models
            .into_iter()
            .map(|model| (model.id, Profile::from(model)))
            .collect();

        let mut out = Vec::with_capacity(by_friend.len());
        for (friend_id, balances) in by_friend {
            let Some(profile) = profiles.get(&friend_id) else {
                continue;
            };
            out.push(FriendBalances {
                friend: profile.clone(),
                balances,
            });
        }
        Ok(out)
    }

    /// Per-currency balances between two users, zero rows included.
    pub async fn balances_with_friend(
        &self,
        user_id: i32,
        friend_id: i32,
    ) -> ResultLedger<Vec<BalanceAmount>> {
        let rows = balances::Entity::find()
            .filter(balances::Column::UserId.eq(user_id))
            .filter(balances::Column::FriendId.eq(friend_id))
            .order_by_asc(balances::Column::Currency)
            .all(&self.database)
            .await?;

        rows.into_iter().map(BalanceAmount::try_from).collect()
    }
}
