use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use settings::Database;
use tracing_subscriber::EnvFilter;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "moneybook={level},telegram_bot={level},server={level},engine={level},tower_http={level}",
            level = settings.app.level
        ))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let telegram_account = settings.telegram.as_ref().map(|t| t.username.clone());

    if let Some(server) = settings.server {
        let users = settings.users;
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let engine = match engine::Engine::builder().database(db).build().await {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine from database: {err}");
                    return;
                }
            };
            for user in &users {
                if let Err(err) = engine.ensure_user(&user.username, &user.password).await {
                    tracing::error!(username = %user.username, "failed to create user: {err}");
                    return;
                }
            }

            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            let state =
                server::ServerState::new(Arc::new(engine)).telegram_account(telegram_account);
            if let Err(err) = server::run_with_listener(state, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    }

    if let Some(telegram) = settings.telegram {
        tasks.spawn(async move {
            tracing::info!("Found telegram settings...");
            let timezone = match telegram.timezone.as_deref().map(str::parse::<chrono_tz::Tz>) {
                None => chrono_tz::Tz::UTC,
                Some(Ok(tz)) => tz,
                Some(Err(err)) => {
                    tracing::error!("invalid telegram timezone: {err}");
                    return;
                }
            };
            let allowed_users = telegram
                .allowed_users
                .into_iter()
                .map(telegram_bot::UserId)
                .collect();

            match telegram_bot::Bot::builder()
                .token(&telegram.token)
                .allowed_users(allowed_users)
                .server(&telegram.server, &telegram.username, &telegram.password)
                .public_url(&telegram.public_url)
                .timezone(timezone)
                .build()
            {
                Ok(bot) => bot.run().await,
                Err(err) => tracing::error!("failed to initialize telegram bot: {err}"),
            }
        });
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
