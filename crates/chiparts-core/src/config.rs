//! Configuration management for ChiParts

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Telegram delivery configuration
    pub telegram: TelegramConfig,

    /// Audit log configuration
    pub audit: AuditConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from defaults, optionally layered with a TOML file.
    ///
    /// Environment variables and CLI flags are applied afterwards by the
    /// binary through [`Config::apply`].
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder =
            ::config::Config::builder().add_source(::config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Apply explicit overrides on top of the loaded configuration
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(public_url) = overrides.public_url {
            self.server.public_url = public_url;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.server.static_dir = static_dir;
        }
        if let Some(token) = overrides.bot_token {
            self.telegram.bot_token = token;
        }
        if let Some(chat_ids) = overrides.chat_ids {
            self.telegram.chat_ids = parse_chat_ids(&chat_ids);
        }
        if let Some(path) = overrides.audit_path {
            self.audit.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Check the settings required to relay orders
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(Error::config("telegram bot token is empty"));
        }
        if self.telegram.chat_ids.is_empty() {
            return Err(Error::config("at least one telegram chat id is required"));
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Values taken from the environment or the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub public_url: Option<String>,
    pub static_dir: Option<PathBuf>,
    pub bot_token: Option<String>,
    /// Comma-separated chat ids
    pub chat_ids: Option<String>,
    pub audit_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Split a comma-separated chat id list, trimming entries and dropping empty ones
pub fn parse_chat_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Externally visible base URL, used in the start-up notification
    pub public_url: String,
    /// Directory holding the front-end bundle
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            public_url: "localhost".to_string(),
            static_dir: PathBuf::from("public"),
        }
    }
}

/// Telegram delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API access token
    pub bot_token: String,
    /// Bot API base URL
    pub api_base_url: Url,
    /// Destination chat ids, in delivery order
    pub chat_ids: Vec<String>,
}

impl TelegramConfig {
    /// Token prefix safe to print in logs
    pub fn masked_token(&self) -> String {
        let prefix: String = self.bot_token.chars().take(15).collect();
        format!("{prefix}...")
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: "000000000:local-development-token".to_string(),
            api_base_url: Url::parse("https://api.telegram.org/").expect("static URL is valid"),
            chat_ids: vec!["-5264176031".to_string()],
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path of the append-only order log
    pub path: PathBuf,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("orders.log"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_chat_ids_trims_and_drops_empty() {
        assert_eq!(
            parse_chat_ids(" -100, 200 ,,300,"),
            vec!["-100".to_string(), "200".to_string(), "300".to_string()]
        );
        assert!(parse_chat_ids("").is_empty());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.server.port, 10000);
        assert_eq!(config.telegram.chat_ids, vec!["-5264176031".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_replace_loaded_values() {
        let mut config = Config::default();
        config.apply(Overrides {
            port: Some(8081),
            chat_ids: Some("1,2".to_string()),
            audit_path: Some(PathBuf::from("/tmp/orders.log")),
            ..Overrides::default()
        });

        assert_eq!(config.bind_addr(), "0.0.0.0:8081");
        assert_eq!(config.telegram.chat_ids, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(config.audit.path, PathBuf::from("/tmp/orders.log"));
    }

    #[test]
    fn test_validate_rejects_empty_destinations() {
        let mut config = Config::default();
        config.apply(Overrides {
            chat_ids: Some(" , ".to_string()),
            ..Overrides::default()
        });
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_layers_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chiparts.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[telegram]\nchat_ids = [\"42\"]\n",
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.telegram.chat_ids, vec!["42".to_string()]);
        assert_eq!(config.audit.path, PathBuf::from("orders.log"));
    }

    #[test]
    fn test_masked_token_keeps_prefix_only() {
        let telegram = TelegramConfig {
            bot_token: "123456789:ABCDEFGHIJKLMNOP".to_string(),
            ..TelegramConfig::default()
        };
        assert_eq!(telegram.masked_token(), "123456789:ABCDE...");
    }
}
