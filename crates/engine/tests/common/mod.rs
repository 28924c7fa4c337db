#![allow(dead_code)]

use std::path::PathBuf;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{Engine, Money, NewAsset};
use migration::MigratorTrait;

async fn seed_users(db: &DatabaseConnection) {
    let backend = db.get_database_backend();
    for name in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![name.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
}

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_file_db() -> (Engine, DatabaseConnection, PathBuf) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    seed_users(&db).await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db, path)
}

pub fn money(value: &str) -> Money {
    value.parse().unwrap()
}

pub async fn asset_with_balance(engine: &Engine, owner: &str, balance: &str) -> Uuid {
    engine
        .create_asset(owner, NewAsset::new("Wallet").opening_balance(money(balance)))
        .await
        .unwrap()
}

pub async fn balance(engine: &Engine, asset_id: Uuid, owner: &str) -> Money {
    engine.asset(asset_id, owner).await.unwrap().balance
}
