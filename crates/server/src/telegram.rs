//! Chat account linking endpoints.
//!
//! `start`, `stop` and `unlink` are called by the bot with its own account;
//! `link` is opened by the site user with the token the bot showed them.

use api_types::telegram::{TelegramChanged, TelegramLinked, TelegramStartResponse, TelegramUser};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{EngineError, TelegramStart};

use crate::{
    ServerError,
    server::{Caller, ServerState},
};

fn require_service(caller: &Caller) -> Result<(), ServerError> {
    if caller.is_telegram_service {
        Ok(())
    } else {
        Err(EngineError::Forbidden("reserved to the telegram bot".to_string()).into())
    }
}

pub async fn start(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TelegramUser>,
) -> Result<Json<TelegramStartResponse>, ServerError> {
    require_service(&caller)?;
    let response = match state.engine.telegram_start(&payload.tg_username).await? {
        TelegramStart::Linked { username } => TelegramStartResponse::Linked { username },
        TelegramStart::NeedsLink { token } => TelegramStartResponse::NeedsLink { token },
    };
    Ok(Json(response))
}

pub async fn stop(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TelegramUser>,
) -> Result<Json<TelegramChanged>, ServerError> {
    require_service(&caller)?;
    let changed = state.engine.telegram_stop(&payload.tg_username).await?;
    Ok(Json(TelegramChanged { changed }))
}

pub async fn unlink(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Json(payload): Json<TelegramUser>,
) -> Result<Json<TelegramChanged>, ServerError> {
    require_service(&caller)?;
    let changed = state.engine.telegram_unlink(&payload.tg_username).await?;
    Ok(Json(TelegramChanged { changed }))
}

pub async fn link(
    Extension(caller): Extension<Caller>,
    State(state): State<ServerState>,
    Path((tg_username, token)): Path<(String, String)>,
) -> Result<Json<TelegramLinked>, ServerError> {
    state
        .engine
        .telegram_link(&tg_username, &token, &caller.username)
        .await?;
    Ok(Json(TelegramLinked {
        tg_username,
        username: caller.username,
    }))
}
