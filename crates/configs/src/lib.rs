//! # configs
//!
//! Layered application configuration. Later sources win:
//!
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional)
//! 4. environment, prefixed `THREADS` with `__` between sections,
//!    e.g. `THREADS__DATABASE__URL=sqlite://threads.db`
//!
//! A `.env` file is loaded into the environment first when present.

use config::{Config, ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub feed: FeedConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HS256 key shared with the identity provider
    pub jwt_secret: SecretString,
    pub issuer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    /// Threads per home page
    pub page_size: u32,
    /// Users per search page
    pub users_page_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

type Builder = ConfigBuilder<config::builder::DefaultState>;

impl AppConfig {
    /// Loads `.env`, then every layer listed in the module docs.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::build_with(|builder| {
            Ok(builder.add_source(
                Environment::with_prefix("THREADS")
                    .separator("__")
                    .try_parsing(true),
            ))
        })
    }

    /// Defaults and files, with `extra` layered on top.
    pub fn build_with(
        extra: impl FnOnce(Builder) -> Result<Builder, config::ConfigError>,
    ) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite://threads.db")?
            .set_default("database.max_connections", 5)?
            .set_default("feed.page_size", 30)?
            .set_default("feed.users_page_size", 20)?
            .set_default("log.json", false)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        let config: AppConfig = extra(builder)?.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        if self.feed.page_size == 0 || self.feed.users_page_size == 0 {
            return Err(ConfigError::Invalid("feed page sizes must be positive".into()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let config = AppConfig::build_with(|b| b.set_override("auth.jwt_secret", "s3cret")).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.database.url.expose_secret(), "sqlite://threads.db");
        assert_eq!(config.feed.page_size, 30);
        assert_eq!(config.feed.users_page_size, 20);
        assert!(config.auth.issuer.is_none());
        assert!(!config.log.json);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        let err = AppConfig::build_with(Ok).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn empty_secret_is_invalid() {
        let err = AppConfig::build_with(|b| b.set_override("auth.jwt_secret", "")).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = AppConfig::build_with(|b| {
            b.set_override("auth.jwt_secret", "s3cret")?
                .set_override("server.port", 8080)?
                .set_override("feed.page_size", 10)
        })
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.feed.page_size, 10);
    }
}
