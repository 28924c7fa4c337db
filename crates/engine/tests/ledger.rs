mod common;

use std::sync::Arc;

use sea_orm::{ConnectionTrait, Statement};
use tokio::task::JoinSet;
use uuid::Uuid;

use common::{asset_with_balance, balance, engine_with_db, engine_with_file_db, money};
use engine::{
    EngineError, IncomeTransactionFilter, Money, NewAsset, NewTransaction, TransactionKind,
};

#[tokio::test]
async fn income_increases_balance_by_exact_amount() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "10.00").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();

    engine
        .create_income_transaction("alice", asset, salary, money("1234.5678"))
        .await
        .unwrap();

    assert_eq!(balance(&engine, asset, "alice").await, money("1244.5678"));
}

#[tokio::test]
async fn expense_then_delete_restores_balance() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "100.00").await;
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();

    let tx = engine
        .create_expense_transaction("alice", asset, food, money("30.00"), &[])
        .await
        .unwrap();
    assert_eq!(balance(&engine, asset, "alice").await, money("70.00"));

    engine
        .delete_transaction(TransactionKind::Expense, tx, "alice")
        .await
        .unwrap();
    assert_eq!(balance(&engine, asset, "alice").await, money("100.00"));
}

#[tokio::test]
async fn expense_tags_read_back_as_written() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "100.00").await;
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();

    let tags = vec!["lunch".to_string(), "team".to_string()];
    let tx = engine
        .create_expense_transaction("alice", asset, food, money("12.00"), &tags)
        .await
        .unwrap();
    let detail = engine.expense_transaction(tx, "alice").await.unwrap();
    assert_eq!(detail.transaction.tags, tags);

    for bad in [vec!["lunch, team".to_string()], vec!["x".repeat(5000)]] {
        let err = engine
            .create_expense_transaction("alice", asset, food, money("1.00"), &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidField(_)), "{err}");
    }
    assert_eq!(balance(&engine, asset, "alice").await, money("88.00"));
}

#[tokio::test]
async fn income_then_expense_from_zero() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "0").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();
    let rent = engine
        .create_expense_category("alice", "Rent", None)
        .await
        .unwrap();

    engine
        .create_transaction("alice", NewTransaction::income(asset, salary, money("50.00")))
        .await
        .unwrap();
    engine
        .create_transaction("alice", NewTransaction::expense(asset, rent, money("20.00")))
        .await
        .unwrap();

    assert_eq!(balance(&engine, asset, "alice").await, money("30.00"));
}

#[tokio::test]
async fn create_then_delete_income_is_a_no_op() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "5.5").await;
    let gift = engine.create_income_source("alice", "Gift").await.unwrap();

    let tx = engine
        .create_income_transaction("alice", asset, gift, money("0.0001"))
        .await
        .unwrap();
    engine
        .delete_transaction(TransactionKind::Income, tx, "alice")
        .await
        .unwrap();

    assert_eq!(balance(&engine, asset, "alice").await, money("5.5"));
}

#[tokio::test]
async fn four_decimal_amount_is_stored_exactly() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "0").await;
    let gift = engine.create_income_source("alice", "Gift").await.unwrap();

    let tx = engine
        .create_income_transaction("alice", asset, gift, money("19.9999"))
        .await
        .unwrap();

    let detail = engine.income_transaction(tx, "alice").await.unwrap();
    assert_eq!(detail.transaction.amount, Money::new(199_999));
    assert_eq!(detail.transaction.amount.to_string(), "19.9999");
    assert_eq!(detail.asset.balance.to_string(), "19.9999");
}

#[tokio::test]
async fn unknown_category_leaves_balance_unchanged() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "100").await;

    let err = engine
        .create_expense_transaction("alice", asset, Uuid::new_v4(), money("30"), &[])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::KeyNotFound("expense category not exists".to_string())
    );
    assert_eq!(balance(&engine, asset, "alice").await, money("100"));
}

#[tokio::test]
async fn rejected_insert_rolls_back_balance_update() {
    let (engine, db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "100").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();

    // The balance update runs before the insert; make the insert fail.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TRIGGER reject_income BEFORE INSERT ON income_transactions \
         WHEN NEW.amount_minor = 4242 \
         BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    ))
    .await
    .unwrap();

    let result = engine
        .create_income_transaction("alice", asset, salary, Money::new(4242))
        .await;
    assert!(matches!(result, Err(EngineError::Database(_))));

    assert_eq!(balance(&engine, asset, "alice").await, money("100"));
    let page = engine
        .list_income_transactions("alice", IncomeTransactionFilter::default(), 1)
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "1").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();

    for amount in ["0", "-5"] {
        let err = engine
            .create_income_transaction("alice", asset, salary, money(amount))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
    assert_eq!(balance(&engine, asset, "alice").await, money("1"));
}

#[tokio::test]
async fn overflowing_balance_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let asset = engine
        .create_asset(
            "alice",
            NewAsset::new("Savings").opening_balance(Money::new(i64::MAX - 1)),
        )
        .await
        .unwrap();
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();

    let err = engine
        .create_income_transaction("alice", asset, salary, Money::new(2))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InvalidAmount(_)));
    assert_eq!(balance(&engine, asset, "alice").await, Money::new(i64::MAX - 1));
}

#[tokio::test]
async fn other_users_rows_look_missing() {
    let (engine, _db) = engine_with_db().await;
    let alice_asset = asset_with_balance(&engine, "alice", "100").await;
    let alice_salary = engine.create_income_source("alice", "Salary").await.unwrap();
    let bob_salary = engine.create_income_source("bob", "Salary").await.unwrap();

    let err = engine
        .create_income_transaction("bob", alice_asset, bob_salary, money("1"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("asset not exists".to_string()));

    let err = engine
        .create_income_transaction("alice", alice_asset, bob_salary, money("1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("income source not exists".to_string())
    );

    let tx = engine
        .create_income_transaction("alice", alice_asset, alice_salary, money("1"))
        .await
        .unwrap();
    let err = engine
        .delete_transaction(TransactionKind::Income, tx, "bob")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
    assert!(engine.income_transaction(tx, "bob").await.is_err());
    assert_eq!(balance(&engine, alice_asset, "alice").await, money("101"));
}

#[tokio::test]
async fn deleting_twice_reports_not_found() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "10").await;
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();
    let tx = engine
        .create_expense_transaction("alice", asset, food, money("4"), &[])
        .await
        .unwrap();

    engine
        .delete_transaction(TransactionKind::Expense, tx, "alice")
        .await
        .unwrap();
    let err = engine
        .delete_transaction(TransactionKind::Expense, tx, "alice")
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(balance(&engine, asset, "alice").await, money("10"));
}

#[tokio::test]
async fn wrong_kind_does_not_delete() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "10").await;
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();
    let tx = engine
        .create_expense_transaction("alice", asset, food, money("4"), &[])
        .await
        .unwrap();

    assert!(
        engine
            .delete_transaction(TransactionKind::Income, tx, "alice")
            .await
            .is_err()
    );
    assert_eq!(balance(&engine, asset, "alice").await, money("6"));
}

#[tokio::test]
async fn deleting_expense_category_gives_money_back() {
    let (engine, _db) = engine_with_db().await;
    let cash = asset_with_balance(&engine, "alice", "100").await;
    let card = asset_with_balance(&engine, "alice", "200").await;
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();
    let fun = engine
        .create_expense_category("alice", "Fun", None)
        .await
        .unwrap();

    for (asset, amount) in [(cash, "10"), (cash, "5.5"), (card, "40")] {
        engine
            .create_expense_transaction("alice", asset, food, money(amount), &[])
            .await
            .unwrap();
    }
    engine
        .create_expense_transaction("alice", card, fun, money("1"), &[])
        .await
        .unwrap();

    engine.delete_expense_category(food, "alice").await.unwrap();

    assert_eq!(balance(&engine, cash, "alice").await, money("100"));
    assert_eq!(balance(&engine, card, "alice").await, money("199"));
    assert!(engine.expense_category(food, "alice").await.is_err());
    assert!(engine.asset_audit(card, "alice").await.unwrap().is_consistent());
}

#[tokio::test]
async fn deleting_income_source_takes_money_back() {
    let (engine, _db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "0").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();
    engine
        .create_income_transaction("alice", asset, salary, money("1000"))
        .await
        .unwrap();

    engine.delete_income_source(salary, "alice").await.unwrap();

    assert_eq!(balance(&engine, asset, "alice").await, Money::ZERO);
    let page = engine
        .list_income_transactions(
            "alice",
            IncomeTransactionFilter {
                asset_id: Some(asset),
                income_source_id: None,
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(page.total_items, 0);
}

#[tokio::test]
async fn deleting_asset_removes_its_transactions() {
    let (engine, _db) = engine_with_db().await;
    let doomed = asset_with_balance(&engine, "alice", "0").await;
    let kept = asset_with_balance(&engine, "alice", "0").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();
    engine
        .create_income_transaction("alice", doomed, salary, money("3"))
        .await
        .unwrap();
    engine
        .create_income_transaction("alice", kept, salary, money("4"))
        .await
        .unwrap();

    engine.delete_asset(doomed, "alice").await.unwrap();

    let page = engine
        .list_income_transactions(
            "alice",
            IncomeTransactionFilter {
                asset_id: None,
                income_source_id: Some(salary),
            },
            1,
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].asset_id, kept);
    assert!(matches!(
        engine.asset(doomed, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn audit_detects_and_recompute_repairs_drift() {
    let (engine, db) = engine_with_db().await;
    let asset = asset_with_balance(&engine, "alice", "100").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();
    let food = engine
        .create_expense_category("alice", "Food", None)
        .await
        .unwrap();
    engine
        .create_income_transaction("alice", asset, salary, money("25"))
        .await
        .unwrap();
    engine
        .create_expense_transaction("alice", asset, food, money("7.25"), &[])
        .await
        .unwrap();

    let audit = engine.asset_audit(asset, "alice").await.unwrap();
    assert!(audit.is_consistent());
    assert_eq!(audit.expected, money("117.75"));
    assert_eq!(audit.income_total, money("25"));
    assert_eq!(audit.expense_total, money("7.25"));

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE assets SET balance_minor = 0 WHERE id = ?",
        vec![asset.to_string().into()],
    ))
    .await
    .unwrap();
    assert!(!engine.asset_audit(asset, "alice").await.unwrap().is_consistent());

    let before = engine.recompute_asset_balance(asset, "alice").await.unwrap();
    assert_eq!(before.recorded, Money::ZERO);
    assert_eq!(balance(&engine, asset, "alice").await, money("117.75"));
}

#[tokio::test]
async fn concurrent_writers_never_lose_an_update() {
    let (engine, db, path) = engine_with_file_db().await;
    let engine = Arc::new(engine);
    let asset = asset_with_balance(&engine, "alice", "0").await;
    let salary = engine.create_income_source("alice", "Salary").await.unwrap();

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move {
            engine
                .create_income_transaction("alice", asset, salary, money("1.0001"))
                .await
        });
    }

    let mut committed = 0_i64;
    while let Some(joined) = tasks.join_next().await {
        match joined.unwrap() {
            Ok(_) => committed += 1,
            Err(EngineError::Conflict(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(committed > 0);
    assert_eq!(
        balance(&engine, asset, "alice").await,
        Money::new(committed * 10_001)
    );
    assert!(engine.asset_audit(asset, "alice").await.unwrap().is_consistent());

    drop(engine);
    db.close().await.unwrap();
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
