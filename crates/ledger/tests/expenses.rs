use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::sync::Mutex;

use ledger::{
    Currency, Effect, ExpenseCmd, Ledger, LedgerError, Money, NotificationDispatcher, PushPayload,
};
use migration::MigratorTrait;

async fn ledger_with_db() -> (Ledger, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (id, name, email) in [
        (1, "Alice", "alice@example.com"),
        (2, "Bob", "bob@example.com"),
        (3, "Carol", "carol@example.com"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (id, name, email) VALUES (?, ?, ?)",
            vec![id.into(), name.into(), email.into()],
        ))
        .await
        .unwrap();
    }
    let ledger = Ledger::builder().database(db.clone()).build().await.unwrap();
    (ledger, db)
}

fn usd() -> Currency {
    Currency::try_from("USD").unwrap()
}

fn money(raw: &str) -> Money {
    raw.parse().unwrap()
}

async fn pair_balance(ledger: &Ledger, user_id: i32, friend_id: i32) -> Vec<(String, i64)> {
    ledger
        .balances_with_friend(user_id, friend_id)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| (entry.currency.code().to_string(), entry.amount.minor_units()))
        .collect()
}

#[derive(Default)]
struct RecordingDispatcher(Mutex<Vec<(i32, PushPayload)>>);

#[async_trait::async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn deliver(
        &self,
        user_id: i32,
        payload: &PushPayload,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.0.lock().unwrap().push((user_id, payload.clone()));
        Ok(())
    }
}

#[tokio::test]
async fn expense_moves_pairwise_balances() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("100.00"))
                .share(1, money("-50.00"))
                .share(2, money("-50.00")),
        )
        .await
        .unwrap();

    assert!(outcome.created);
    assert_eq!(
        outcome.effects,
        vec![
            Effect::ReconcileZeroBalances {
                user_id: 1,
                friend_ids: vec![2],
                currency: usd(),
            },
            Effect::NotifyExpense {
                expense_id: outcome.expense.id,
            },
        ]
    );

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 5000)]
    );
    assert_eq!(
        pair_balance(&ledger, 2, 1).await,
        vec![("USD".to_string(), -5000)]
    );
}

#[tokio::test]
async fn uneven_split_conserves_the_paid_amount() {
    let (ledger, _db) = ledger_with_db().await;

    ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Groceries", usd(), money("10.00"))
                .share(2, money("-3.00"))
                .share(3, money("-7.00")),
        )
        .await
        .unwrap();

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 300)]
    );
    assert_eq!(
        pair_balance(&ledger, 1, 3).await,
        vec![("USD".to_string(), 700)]
    );
    // Bob and Carol never owed each other anything.
    assert_eq!(pair_balance(&ledger, 2, 3).await, vec![]);
}

#[tokio::test]
async fn group_expense_mirrors_personal_deltas() {
    let (ledger, _db) = ledger_with_db().await;

    let group = ledger.create_group("Trip", 1).await.unwrap();
    ledger.join_group(2, &group.public_id).await.unwrap();

    ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Hotel", usd(), money("50.00"))
                .share(2, money("-50.00"))
                .group_id(group.id),
        )
        .await
        .unwrap();

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 5000)]
    );

    let overviews = ledger.groups_for_user(1).await.unwrap();
    assert_eq!(overviews.len(), 1);
    let overview = &overviews[0];
    assert_eq!(overview.group.id, group.id);
    assert_eq!(overview.members.len(), 2);

    let entry = overview
        .balances
        .iter()
        .find(|entry| entry.user_id == 1 && entry.friend_id == 2)
        .unwrap();
    assert_eq!(entry.amount.minor_units(), 5000);
    let mirrored = overview
        .balances
        .iter()
        .find(|entry| entry.user_id == 2 && entry.friend_id == 1)
        .unwrap();
    assert_eq!(mirrored.amount.minor_units(), -5000);
}

#[tokio::test]
async fn delete_restores_exact_balances() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("100.00"))
                .share(1, money("-50.00"))
                .share(2, money("-50.00"))
                .transaction_id("bank-1"),
        )
        .await
        .unwrap();

    let effects = ledger.delete_expense(outcome.expense.id, 1).await.unwrap();
    assert_eq!(
        effects,
        vec![Effect::NotifyExpense {
            expense_id: outcome.expense.id,
        }]
    );

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 0)]
    );
    assert_eq!(
        pair_balance(&ledger, 2, 1).await,
        vec![("USD".to_string(), 0)]
    );

    let expense = ledger.expense_details(outcome.expense.id).await.unwrap();
    assert!(expense.deleted_at.is_some());
    assert_eq!(expense.deleted_by, Some(1));
    // The dedup key is released on deletion.
    assert_eq!(expense.transaction_id, None);

    let err = ledger
        .delete_expense(outcome.expense.id, 1)
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound("expense not exists".to_string()));
}

#[tokio::test]
async fn deletion_reverses_odd_cent_splits_exactly() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Brunch", usd(), money("66.67"))
                .share(2, money("-33.33"))
                .share(3, money("-33.34")),
        )
        .await
        .unwrap();

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 3333)]
    );
    assert_eq!(
        pair_balance(&ledger, 1, 3).await,
        vec![("USD".to_string(), 3334)]
    );

    ledger.delete_expense(outcome.expense.id, 1).await.unwrap();

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 0)]
    );
    assert_eq!(
        pair_balance(&ledger, 1, 3).await,
        vec![("USD".to_string(), 0)]
    );
}

#[tokio::test]
async fn deleting_a_group_expense_restores_the_group_mirror() {
    let (ledger, _db) = ledger_with_db().await;

    let group = ledger.create_group("Trip", 1).await.unwrap();
    ledger.join_group(2, &group.public_id).await.unwrap();

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Hotel", usd(), money("25.00"))
                .share(2, money("-25.00"))
                .group_id(group.id),
        )
        .await
        .unwrap();

    ledger.delete_expense(outcome.expense.id, 1).await.unwrap();

    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 0)]
    );
    let overview = &ledger.groups_for_user(1).await.unwrap()[0];
    assert!(overview.balances.iter().all(|entry| entry.amount.is_zero()));
}

#[tokio::test]
async fn duplicate_transaction_id_returns_the_stored_expense() {
    let (ledger, _db) = ledger_with_db().await;

    let first = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("100.00"))
                .share(2, money("-50.00"))
                .transaction_id("bank-1"),
        )
        .await
        .unwrap();
    assert!(first.created);
    assert!(first.expense.imported);

    let second = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner again", usd(), money("100.00"))
                .share(2, money("-50.00"))
                .transaction_id("bank-1"),
        )
        .await
        .unwrap();

    assert!(!second.created);
    assert_eq!(second.expense.id, first.expense.id);
    assert_eq!(second.effects, vec![]);

    // The duplicate submission did not move anything.
    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 5000)]
    );
}

#[tokio::test]
async fn deleted_transaction_id_can_be_booked_again() {
    let (ledger, _db) = ledger_with_db().await;

    let first = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("100.00"))
                .share(2, money("-50.00"))
                .transaction_id("bank-1"),
        )
        .await
        .unwrap();
    ledger.delete_expense(first.expense.id, 1).await.unwrap();

    let second = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("100.00"))
                .share(2, money("-50.00"))
                .transaction_id("bank-1"),
        )
        .await
        .unwrap();

    assert!(second.created);
    assert_ne!(second.expense.id, first.expense.id);
    assert_eq!(
        pair_balance(&ledger, 1, 2).await,
        vec![("USD".to_string(), 5000)]
    );
}

#[tokio::test]
async fn settling_up_zeroes_the_group_mirror() {
    let (ledger, _db) = ledger_with_db().await;

    let group = ledger.create_group("Trip", 1).await.unwrap();
    ledger.join_group(2, &group.public_id).await.unwrap();

    ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Hotel", usd(), money("50.00"))
                .share(2, money("-50.00"))
                .group_id(group.id),
        )
        .await
        .unwrap();

    // Bob settles the full amount outside the group.
    let settlement = ledger
        .create_expense(
            ExpenseCmd::new(2, 2, "Settle up", usd(), money("50.00"))
                .share(1, money("-50.00"))
                .split_type(ledger::SplitType::Settlement),
        )
        .await
        .unwrap();
    assert_eq!(pair_balance(&ledger, 1, 2).await, vec![("USD".to_string(), 0)]);

    let dispatcher = RecordingDispatcher::default();
    ledger.apply_effects(&settlement.effects, &dispatcher).await;

    let overview = &ledger.groups_for_user(1).await.unwrap()[0];
    assert!(overview.balances.iter().all(|entry| entry.amount.is_zero()));

    let delivered = dispatcher.0.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, 1);
    assert_eq!(delivered[0].1.title, "Bob");
    assert_eq!(delivered[0].1.message, "Bob settled up USD 50.00");
}

#[tokio::test]
async fn partial_settlement_leaves_the_group_mirror_alone() {
    let (ledger, _db) = ledger_with_db().await;

    let group = ledger.create_group("Trip", 1).await.unwrap();
    ledger.join_group(2, &group.public_id).await.unwrap();

    ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Hotel", usd(), money("50.00"))
                .share(2, money("-50.00"))
                .group_id(group.id),
        )
        .await
        .unwrap();
    ledger
        .create_expense(
            ExpenseCmd::new(2, 2, "Partial", usd(), money("20.00"))
                .share(1, money("-20.00"))
                .split_type(ledger::SplitType::Settlement),
        )
        .await
        .unwrap();

    let zeroed = ledger
        .reconcile_zero_balances(2, &[1], &usd())
        .await
        .unwrap();
    assert_eq!(zeroed, 0);

    let overview = &ledger.groups_for_user(1).await.unwrap()[0];
    let entry = overview
        .balances
        .iter()
        .find(|entry| entry.user_id == 1 && entry.friend_id == 2)
        .unwrap();
    assert_eq!(entry.amount.minor_units(), 5000);
}

#[tokio::test]
async fn expense_in_unknown_group_writes_nothing() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Hotel", usd(), money("50.00"))
                .share(2, money("-50.00"))
                .group_id(999),
        )
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::NotFound("group not exists".to_string()));

    assert_eq!(pair_balance(&ledger, 1, 2).await, vec![]);
    assert_eq!(ledger.expenses_with_friend(1, 2).await.unwrap(), vec![]);
}

#[tokio::test]
async fn unknown_payer_is_a_conflict() {
    let (ledger, _db) = ledger_with_db().await;

    let err = ledger
        .create_expense(
            ExpenseCmd::new(99, 1, "Dinner", usd(), money("10.00")).share(2, money("-5.00")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Conflict(_)));

    assert_eq!(pair_balance(&ledger, 2, 99).await, vec![]);
}

#[tokio::test]
async fn payer_only_expense_moves_no_balances() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Solo coffee", usd(), money("3.00"))
                .share(1, money("-3.00")),
        )
        .await
        .unwrap();

    assert!(ledger.friend_balances(1).await.unwrap().is_empty());

    let expense = ledger.expense_details(outcome.expense.id).await.unwrap();
    assert_eq!(expense.participants.len(), 1);
    assert_eq!(expense.participants[0].amount, money("-3.00"));
}

#[tokio::test]
async fn participants_other_than_the_creator_are_notified() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("42.50"))
                .share(1, money("-21.25"))
                .share(2, money("-21.25")),
        )
        .await
        .unwrap();

    let dispatcher = RecordingDispatcher::default();
    ledger.apply_effects(&outcome.effects, &dispatcher).await;

    let delivered = dispatcher.0.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, 2);
    assert_eq!(delivered[0].1.title, "Alice");
    assert_eq!(delivered[0].1.message, "Alice paid USD 42.50 for Dinner");
}

#[tokio::test]
async fn deleting_notifies_with_the_deleter_as_actor() {
    let (ledger, _db) = ledger_with_db().await;

    let outcome = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Dinner", usd(), money("42.50"))
                .share(1, money("0.00"))
                .share(2, money("-42.50")),
        )
        .await
        .unwrap();
    let effects = ledger.delete_expense(outcome.expense.id, 2).await.unwrap();

    let dispatcher = RecordingDispatcher::default();
    ledger.apply_effects(&effects, &dispatcher).await;

    let delivered = dispatcher.0.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    // Bob deleted, so only Alice hears about it.
    assert_eq!(delivered[0].0, 1);
    assert_eq!(delivered[0].1.title, "Bob");
    assert_eq!(delivered[0].1.message, "Deleted Dinner");
}

#[tokio::test]
async fn expenses_with_friend_lists_shared_history_newest_first() {
    let (ledger, _db) = ledger_with_db().await;

    let first = ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Breakfast", usd(), money("10.00"))
                .share(2, money("-5.00"))
                .expense_date("2026-08-01T09:00:00Z".parse().unwrap()),
        )
        .await
        .unwrap();
    let second = ledger
        .create_expense(
            ExpenseCmd::new(2, 2, "Lunch", usd(), money("20.00"))
                .share(1, money("-10.00"))
                .expense_date("2026-08-02T13:00:00Z".parse().unwrap()),
        )
        .await
        .unwrap();
    // Carol's expense never involved Bob.
    ledger
        .create_expense(
            ExpenseCmd::new(1, 1, "Museum", usd(), money("30.00"))
                .share(3, money("-15.00")),
        )
        .await
        .unwrap();

    let listed = ledger.expenses_with_friend(1, 2).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.expense.id);
    assert_eq!(listed[1].id, first.expense.id);

    ledger.delete_expense(second.expense.id, 2).await.unwrap();
    let listed = ledger.expenses_with_friend(1, 2).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, first.expense.id);
}
