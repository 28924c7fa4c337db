use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    app_with_db().await.0
}

async fn app_with_db() -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    for name in ["alice", "bob", "bot"] {
        engine.create_user(name, "password").await.unwrap();
    }
    let app =
        router(ServerState::new(Arc::new(engine)).telegram_account(Some("bot".to_string())));
    (app, db)
}

fn basic(user: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:password")))
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    call_with(app, method, uri, user, None, body).await
}

async fn call_with(
    app: &Router,
    method: &str,
    uri: &str,
    user: &str,
    telegram: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user));
    if let Some(tg) = telegram {
        builder = builder.header("telegram-username", tg);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, user: &str, body: Value) -> String {
    let (status, value) = call(app, "POST", uri, user, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{value}");
    value["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let app = app().await;

    let request = Request::builder()
        .uri("/assets")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let request = Request::builder()
        .uri("/assets")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("alice:wrong")),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_then_delete_restores_balance() {
    let app = app().await;
    let asset = create(
        &app,
        "/assets",
        "alice",
        json!({"description": "Cash", "kind": "CA", "start_balance": "100.00"}),
    )
    .await;
    let food = create(
        &app,
        "/expenses",
        "alice",
        json!({"description": "Food", "monthly_limit": "50"}),
    )
    .await;

    let tx = create(
        &app,
        "/expense-transactions",
        "alice",
        json!({
            "asset_id": asset,
            "expense_category_id": food,
            "amount": "30.00",
            "tags": ["market"]
        }),
    )
    .await;

    let (status, body) = call(&app, "GET", &format!("/assets/{asset}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "70.0000");
    assert_eq!(body["kind"], "CA");

    let (status, body) = call(
        &app,
        "GET",
        &format!("/assets/{asset}/outgoing"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["amount"], "30.0000");

    let (status, _) = call(
        &app,
        "DELETE",
        &format!("/expense-transactions/{tx}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = call(&app, "GET", &format!("/assets/{asset}"), "alice", None).await;
    assert_eq!(body["balance"], "100.0000");

    let (_, body) = call(&app, "GET", &format!("/assets/{asset}/audit"), "alice", None).await;
    assert_eq!(body["consistent"], true);
}

#[tokio::test]
async fn expense_category_lists_its_outgoing_transactions() {
    let app = app().await;
    let asset = create(
        &app,
        "/assets",
        "alice",
        json!({"description": "Cash", "start_balance": "20"}),
    )
    .await;
    let food = create(&app, "/expenses", "alice", json!({"description": "Food"})).await;
    let tx = create(
        &app,
        "/expense-transactions",
        "alice",
        json!({
            "asset_id": asset,
            "expense_category_id": food,
            "amount": "7.50",
            "tags": ["lunch", "team"]
        }),
    )
    .await;

    let (status, body) = call(
        &app,
        "GET",
        &format!("/expenses/{food}/outgoing"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["items"][0]["id"], tx.as_str());
    assert_eq!(body["items"][0]["tags"], json!(["lunch", "team"]));

    let (status, _) = call(
        &app,
        "GET",
        &format!("/expenses/{food}/incoming"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tags_with_commas_are_unprocessable() {
    let app = app().await;
    let asset = create(
        &app,
        "/assets",
        "alice",
        json!({"description": "Cash", "start_balance": "20"}),
    )
    .await;
    let food = create(&app, "/expenses", "alice", json!({"description": "Food"})).await;

    let (status, body) = call(
        &app,
        "POST",
        "/expense-transactions",
        "alice",
        Some(json!({
            "asset_id": asset,
            "expense_category_id": food,
            "amount": "1",
            "tags": ["lunch, team"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");

    let (_, body) = call(&app, "GET", &format!("/assets/{asset}"), "alice", None).await;
    assert_eq!(body["balance"], "20.0000");
}

#[tokio::test]
async fn invalid_amounts_are_unprocessable() {
    let app = app().await;
    let asset = create(&app, "/assets", "alice", json!({"description": "Cash"})).await;
    let salary = create(&app, "/incomes", "alice", json!({"description": "Salary"})).await;

    for amount in ["0", "-1", "1.23456", "abc"] {
        let (status, body) = call(
            &app,
            "POST",
            "/income-transactions",
            "alice",
            Some(json!({"asset_id": asset, "income_source_id": salary, "amount": amount})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{amount}: {body}");
    }

    let (_, body) = call(&app, "GET", &format!("/assets/{asset}"), "alice", None).await;
    assert_eq!(body["balance"], "0.0000");
}

#[tokio::test]
async fn other_users_data_is_not_found() {
    let app = app().await;
    let asset = create(&app, "/assets", "alice", json!({"description": "Cash"})).await;

    let (status, _) = call(&app, "GET", &format!("/assets/{asset}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", &format!("/assets/{asset}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/assets", "bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn page_zero_is_rejected() {
    let app = app().await;
    let (status, _) = call(&app, "GET", "/incomes?page=0", "alice", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn common_info_reports_month_totals() {
    let app = app().await;
    let asset = create(
        &app,
        "/assets",
        "alice",
        json!({"description": "Card", "start_balance": "10"}),
    )
    .await;
    let fun = create(
        &app,
        "/expenses",
        "alice",
        json!({"description": "Fun", "monthly_limit": "5"}),
    )
    .await;
    create(
        &app,
        "/expense-transactions",
        "alice",
        json!({"asset_id": asset, "expense_category_id": fun, "amount": "5.0001"}),
    )
    .await;

    let (status, body) = call(&app, "GET", "/common-info", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assets"][0]["balance"], "4.9999");
    assert_eq!(body["expenses"][0]["month_total"], "5.0001");
    assert_eq!(body["expenses"][0]["over_limit"], true);
}

#[tokio::test]
async fn bot_acts_for_linked_chat_user() {
    let app = app().await;

    let (status, _) = call(
        &app,
        "POST",
        "/telegram/start",
        "alice",
        Some(json!({"tg_username": "alice_tg"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &app,
        "POST",
        "/telegram/start",
        "bot",
        Some(json!({"tg_username": "alice_tg"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "needs_link");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = call_with(&app, "GET", "/assets", "bot", Some("alice_tg"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        "GET",
        &format!("/telegram/link/alice_tg/{token}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    create(&app, "/assets", "alice", json!({"description": "Cash"})).await;
    let (status, body) = call_with(&app, "GET", "/assets", "bot", Some("alice_tg"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["description"], "Cash");

    let (status, _) = call_with(&app, "GET", "/assets", "bob", Some("alice_tg"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call(
        &app,
        "POST",
        "/telegram/unlink",
        "bot",
        Some(json!({"tg_username": "alice_tg"})),
    )
    .await;
    assert_eq!(body["changed"], true);
    let (status, _) = call_with(&app, "GET", "/assets", "bot", Some("alice_tg"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_user_lookup_failure_is_a_server_error() {
    let (app, db) = app_with_db().await;

    let (status, _) = call_with(&app, "GET", "/assets", "bot", Some("@"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    db.execute_unprepared("DROP TABLE telegram_users")
        .await
        .unwrap();
    let (status, _) = call_with(&app, "GET", "/assets", "bot", Some("alice_tg"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = call(&app, "GET", "/assets", "bot", None).await;
    assert_eq!(status, StatusCode::OK);
}
