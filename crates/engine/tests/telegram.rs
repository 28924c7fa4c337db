mod common;

use common::engine_with_db;
use engine::{EngineError, TelegramStart};

#[tokio::test]
async fn link_flow() {
    let (engine, _db) = engine_with_db().await;

    let TelegramStart::NeedsLink { token } = engine.telegram_start("@Alice_TG").await.unwrap()
    else {
        panic!("fresh account must need a link");
    };
    assert_eq!(engine.telegram_user("alice_tg").await.unwrap(), None);

    let err = engine
        .telegram_link("alice_tg", "wrong", "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine
        .telegram_link("alice_tg", &token, "alice")
        .await
        .unwrap();
    assert_eq!(
        engine.telegram_user("@alice_tg").await.unwrap().as_deref(),
        Some("alice")
    );

    // Tokens are single use.
    assert!(
        engine
            .telegram_link("alice_tg", &token, "bob")
            .await
            .is_err()
    );

    assert_eq!(
        engine.telegram_start("alice_tg").await.unwrap(),
        TelegramStart::Linked {
            username: "alice".to_string()
        }
    );
}

#[tokio::test]
async fn stop_and_unlink() {
    let (engine, _db) = engine_with_db().await;
    assert!(!engine.telegram_stop("ghost").await.unwrap());
    assert!(!engine.telegram_unlink("ghost").await.unwrap());

    let TelegramStart::NeedsLink { token } = engine.telegram_start("bob_tg").await.unwrap() else {
        panic!("fresh account must need a link");
    };
    engine.telegram_link("bob_tg", &token, "bob").await.unwrap();

    assert!(engine.telegram_stop("bob_tg").await.unwrap());
    assert!(engine.telegram_unlink("bob_tg").await.unwrap());
    assert_eq!(engine.telegram_user("bob_tg").await.unwrap(), None);
    assert!(!engine.telegram_unlink("bob_tg").await.unwrap());

    // A new start issues a fresh token.
    let again = engine.telegram_start("bob_tg").await.unwrap();
    assert!(matches!(again, TelegramStart::NeedsLink { token: t } if t != token));
}

#[tokio::test]
async fn link_to_unknown_site_user_fails() {
    let (engine, _db) = engine_with_db().await;
    let TelegramStart::NeedsLink { token } = engine.telegram_start("x").await.unwrap() else {
        panic!("fresh account must need a link");
    };
    let err = engine.telegram_link("x", &token, "mallory").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
    assert!(engine.telegram_link("nobody", &token, "alice").await.is_err());
}
