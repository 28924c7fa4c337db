//! Handles settings for the application. Configuration is read from
//! `settings.toml` in the working directory, then from `MONEYBOOK__*`
//! environment variables (`MONEYBOOK__SERVER__PORT=8080`).
//!
//! See `settings.toml` for an example.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    /// Server address used for API calls.
    pub server: String,
    /// Address put in the account link; defaults to `server`.
    #[serde(default)]
    pub public_url: String,
    /// Site account the bot logs in with.
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    /// IANA name, e.g. `Europe/Rome`.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Account created at startup when missing.
#[derive(Debug, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub telegram: Option<Telegram>,
    #[serde(default)]
    pub users: Vec<User>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("settings").required(false))
                .add_source(Environment::with_prefix("MONEYBOOK").separator("__")),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::from_config(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn full_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            database = { sqlite = "moneybook.db" }
            port = 3000

            [telegram]
            token = "123:abc"
            server = "http://127.0.0.1:3000"
            username = "bot"
            password = "secret"
            allowed_users = [42]
            timezone = "Europe/Rome"

            [[users]]
            username = "alice"
            password = "password"
            "#,
        );

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.database, Database::Sqlite("moneybook.db".to_string()));
        assert_eq!(server.bind, None);
        let telegram = settings.telegram.unwrap();
        assert_eq!(telegram.allowed_users, vec![42]);
        assert_eq!(telegram.public_url, "");
        assert_eq!(settings.users.len(), 1);
    }

    #[test]
    fn sections_are_optional() {
        let settings = parse(
            r#"
            [server]
            database = "memory"
            port = 8080
            "#,
        );
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.unwrap().database, Database::Memory);
        assert!(settings.telegram.is_none());
        assert!(settings.users.is_empty());
    }
}
