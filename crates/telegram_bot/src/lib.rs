//! Telegram bot.
//!
//! The bot is a thin client: it talks only to the HTTP server API and never
//! accesses the database directly. It logs in with its own site account and
//! names the chat user in the `telegram-username` header of each request.

use base64::Engine;
use chrono_tz::Tz;
use reqwest::{Client, header};
use teloxide::{prelude::*, utils::command::BotCommands};

pub use teloxide::types::UserId;

mod api;
mod commands;
mod dialog;
mod handlers;
mod parsing;
mod state;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    api: api::ApiClient,
    sessions: state::SessionStore,
    bot_username: String,
    timezone: Tz,
    /// Site URL put in the account link sent by /start.
    link_base: String,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    server: String,
    public_url: String,
    client: Client,
    timezone: Tz,
}

impl Bot {
    pub fn new(
        token: &str,
        allowed_users: Option<Vec<UserId>>,
        server: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, String> {
        // Basic authorization is in the form "Basic `secret`" where `secret` is
        // the base64 of the string "username:password".
        let secret = format!("{username}:{password}");
        let secret = format!("Basic {}", base64::prelude::BASE64_STANDARD.encode(secret));

        let mut auth = header::HeaderValue::try_from(secret)
            .map_err(|err| format!("invalid auth header value: {err}"))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;

        Ok(Self {
            token: token.to_string(),
            allowed_users,
            server: server.to_string(),
            public_url: server.to_string(),
            client,
            timezone: Tz::UTC,
        })
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let me = match bot.get_me().await {
            Ok(me) => me,
            Err(err) => {
                tracing::error!("failed to reach telegram: {err}");
                return;
            }
        };
        if let Err(err) = bot.set_my_commands(commands::Command::bot_commands()).await {
            tracing::warn!("failed to register bot commands: {err}");
        }

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            api: api::ApiClient::new(self.client.clone(), self.server.clone()),
            sessions: state::SessionStore::default(),
            bot_username: me.username().to_string(),
            timezone: self.timezone,
            link_base: self.public_url.clone(),
        };

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    server: String,
    username: String,
    password: String,
    public_url: Option<String>,
    timezone: Option<Tz>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: Vec<UserId>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users);
        }
        self
    }

    pub fn server(mut self, server: &str, username: &str, password: &str) -> BotBuilder {
        self.server = server.to_string();
        self.username = username.to_string();
        self.password = password.to_string();
        self
    }

    /// Address users open in a browser; defaults to the server address.
    pub fn public_url(mut self, url: &str) -> BotBuilder {
        if !url.trim().is_empty() {
            self.public_url = Some(url.to_string());
        }
        self
    }

    /// Time zone used to show transaction dates.
    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        let mut bot = Bot::new(
            &self.token,
            self.allowed_users,
            &self.server,
            &self.username,
            &self.password,
        )?;
        if let Some(url) = self.public_url {
            bot.public_url = url;
        }
        if let Some(timezone) = self.timezone {
            bot.timezone = timezone;
        }
        Ok(bot)
    }
}
