use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, User, users};

use super::{Engine, with_tx};

impl Engine {
    /// Register a site user.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidField(
                "username must not be empty".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(EngineError::InvalidField(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            let model = users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username, "user created");
            Ok(User::from(model))
        })
    }

    /// Create the user unless it already exists. Used to seed accounts from
    /// the configuration; an existing password is left as is.
    pub async fn ensure_user(&self, username: &str, password: &str) -> ResultEngine<User> {
        match self.create_user(username, password).await {
            Ok(user) => Ok(user),
            Err(EngineError::ExistingKey(_)) => Ok(User {
                username: username.trim().to_string(),
            }),
            Err(err) => Err(err),
        }
    }

    /// Return the user when `password` matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        Ok(model.filter(|m| m.password == password).map(User::from))
    }
}
