//! Linking chat accounts to site users.
//!
//! `/start` hands out a one-shot token; the site user proves who they are by
//! calling the authenticated link endpoint with it.

use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, telegram_users};

use super::{Engine, with_tx};

/// Outcome of `/start`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TelegramStart {
    /// Already linked; the account was (re)activated.
    Linked { username: String },
    /// Not linked yet; the site user must confirm with this token.
    NeedsLink { token: String },
}

impl Engine {
    pub async fn telegram_start(&self, tg_username: &str) -> ResultEngine<TelegramStart> {
        let tg_username = normalize_tg_username(tg_username)?;
        with_tx!(self, |db_tx| {
            let existing = telegram_users::Entity::find_by_id(tg_username.clone())
                .one(&db_tx)
                .await?;

            if let Some(model) = &existing
                && let Some(username) = model.username.clone()
            {
                telegram_users::ActiveModel {
                    tg_username: ActiveValue::Set(model.tg_username.clone()),
                    is_active: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
                Ok(TelegramStart::Linked { username })
            } else {
                let token = Uuid::new_v4().simple().to_string();
                let active = telegram_users::ActiveModel {
                    tg_username: ActiveValue::Set(tg_username.clone()),
                    username: ActiveValue::Set(None),
                    is_active: ActiveValue::Set(true),
                    link_token: ActiveValue::Set(Some(token.clone())),
                    updated_at: ActiveValue::Set(Utc::now()),
                };
                if existing.is_some() {
                    active.update(&db_tx).await?;
                } else {
                    active.insert(&db_tx).await?;
                }
                tracing::info!(tg_username = %tg_username, "telegram link token issued");
                Ok(TelegramStart::NeedsLink { token })
            }
        })
    }

    /// Bind `tg_username` to `username` when `token` matches the one issued
    /// by [`Engine::telegram_start`].
    pub async fn telegram_link(
        &self,
        tg_username: &str,
        token: &str,
        username: &str,
    ) -> ResultEngine<()> {
        let tg_username = normalize_tg_username(tg_username)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, username).await?;
            let model = telegram_users::Entity::find_by_id(tg_username.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("telegram user not exists".to_string()))?;
            if model.link_token.as_deref() != Some(token) {
                return Err(EngineError::Forbidden("invalid link token".to_string()));
            }
            telegram_users::ActiveModel {
                tg_username: ActiveValue::Set(model.tg_username),
                username: ActiveValue::Set(Some(username.to_string())),
                is_active: ActiveValue::Set(true),
                link_token: ActiveValue::Set(None),
                updated_at: ActiveValue::Set(Utc::now()),
            }
            .update(&db_tx)
            .await?;
            tracing::info!(tg_username = %tg_username, username, "telegram account linked");
            Ok(())
        })
    }

    /// Deactivate a chat account. Returns `false` when it was never seen.
    pub async fn telegram_stop(&self, tg_username: &str) -> ResultEngine<bool> {
        let tg_username = normalize_tg_username(tg_username)?;
        with_tx!(self, |db_tx| {
            let Some(model) = telegram_users::Entity::find_by_id(tg_username)
                .one(&db_tx)
                .await?
            else {
                return Ok(false);
            };
            telegram_users::ActiveModel {
                tg_username: ActiveValue::Set(model.tg_username),
                is_active: ActiveValue::Set(false),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(true)
        })
    }

    /// Drop the link to the site user. Returns `false` when there was none.
    pub async fn telegram_unlink(&self, tg_username: &str) -> ResultEngine<bool> {
        let tg_username = normalize_tg_username(tg_username)?;
        with_tx!(self, |db_tx| {
            let Some(model) = telegram_users::Entity::find_by_id(tg_username)
                .one(&db_tx)
                .await?
            else {
                return Ok(false);
            };
            if model.username.is_none() {
                return Ok(false);
            }
            telegram_users::ActiveModel {
                tg_username: ActiveValue::Set(model.tg_username),
                username: ActiveValue::Set(None),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(true)
        })
    }

    /// Site user linked to a chat account, if any.
    pub async fn telegram_user(&self, tg_username: &str) -> ResultEngine<Option<String>> {
        let tg_username = normalize_tg_username(tg_username)?;
        let model = telegram_users::Entity::find_by_id(tg_username)
            .one(&self.database)
            .await?;
        Ok(model.and_then(|m| m.username))
    }
}

/// Telegram usernames are case-insensitive and often typed with a leading `@`.
fn normalize_tg_username(value: &str) -> ResultEngine<String> {
    let name = value.trim().trim_start_matches('@').to_lowercase();
    if name.is_empty() {
        return Err(EngineError::InvalidField(
            "telegram username must not be empty".to_string(),
        ));
    }
    Ok(name)
}
