//! Configuration loading and validation.
//!
//! Connections are described in a TOML file, deserialized with serde and
//! validated at startup. Validation failures are typed and name the
//! offending connection.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors loading or validating the bot configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Could not read the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the expected shape.
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    /// One connection entry failed validation.
    #[error("connection {index}: {source}")]
    Connection {
        /// Zero-based index of the offending `[[connections]]` entry.
        index: usize,
        /// What was wrong with it.
        #[source]
        source: ValidationError,
    },
}

/// Reasons a single connection entry is invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// Port 0 is not connectable.
    #[error("port must be non-zero")]
    InvalidPort,

    /// A required field was empty.
    #[error("{field} must not be empty")]
    EmptyField {
        /// The field name.
        field: &'static str,
    },

    /// A field that must be alphanumeric was not.
    #[error("{field} must be alphanumeric")]
    NotAlphanumeric {
        /// The field name.
        field: &'static str,
    },
}

/// Validated settings for one server connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server hostname or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Upgrade the connection to TLS before the handshake.
    #[serde(default)]
    pub use_tls: bool,
    /// Nickname to register with.
    pub nick: String,
    /// Username (ident) for the `USER` command. Alphanumeric.
    pub username: String,
    /// Real name for the `USER` command. Alphanumeric.
    pub realname: String,
}

impl ServerConfig {
    /// Check field-level constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }

        let required = [
            ("host", &self.host),
            ("nick", &self.nick),
            ("username", &self.username),
            ("realname", &self.realname),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::EmptyField { field });
            }
        }

        let alphanumeric = [("username", &self.username), ("realname", &self.realname)];
        for (field, value) in alphanumeric {
            if !value.chars().all(char::is_alphanumeric) {
                return Err(ValidationError::NotAlphanumeric { field });
            }
        }

        Ok(())
    }
}

/// The full bot configuration: one entry per server connection.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Per-server connection entries.
    #[serde(default)]
    pub connections: Vec<ServerConfig>,
}

impl BotConfig {
    /// Parse and validate a TOML document.
    pub fn parse(text: &str) -> Result<BotConfig, ConfigError> {
        let config: BotConfig = toml::from_str(text)?;
        for (index, connection) in config.connections.iter().enumerate() {
            connection
                .validate()
                .map_err(|source| ConfigError::Connection { index, source })?;
        }
        Ok(config)
    }

    /// Read, parse, and validate a TOML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<BotConfig, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"
        [[connections]]
        host = "irc.example.com"
        port = 6697
        use_tls = true
        nick = "slircbot"
        username = "slircbot"
        realname = "slircbot"
    "#;

    #[test]
    fn test_parse_valid_config() {
        let config = BotConfig::parse(VALID).unwrap();
        assert_eq!(config.connections.len(), 1);

        let conn = &config.connections[0];
        assert_eq!(conn.host, "irc.example.com");
        assert_eq!(conn.port, 6697);
        assert!(conn.use_tls);
    }

    #[test]
    fn test_use_tls_defaults_to_false() {
        let config = BotConfig::parse(
            r#"
            [[connections]]
            host = "irc.example.com"
            port = 6667
            nick = "bot"
            username = "bot"
            realname = "bot"
        "#,
        )
        .unwrap();
        assert!(!config.connections[0].use_tls);
    }

    #[test]
    fn test_zero_port_rejected() {
        let err = BotConfig::parse(
            r#"
            [[connections]]
            host = "irc.example.com"
            port = 0
            nick = "bot"
            username = "bot"
            realname = "bot"
        "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Connection { index: 0, source } => {
                assert_eq!(source, ValidationError::InvalidPort);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_alphanumeric_username_rejected() {
        let err = BotConfig::parse(
            r#"
            [[connections]]
            host = "irc.example.com"
            port = 6667
            nick = "bot"
            username = "bo t"
            realname = "bot"
        "#,
        )
        .unwrap_err();

        match err {
            ConfigError::Connection { source, .. } => {
                assert_eq!(
                    source,
                    ValidationError::NotAlphanumeric { field: "username" }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_nick_rejected() {
        let config = ServerConfig {
            host: "irc.example.com".to_string(),
            port: 6667,
            use_tls: false,
            nick: String::new(),
            username: "bot".to_string(),
            realname: "bot".to_string(),
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptyField { field: "nick" })
        );
    }

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = BotConfig::from_path(file.path()).unwrap();
        assert_eq!(config.connections[0].nick, "slircbot");
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let err = BotConfig::parse(
            r#"
            [[connections]]
            host = "irc.example.com"
            port = 6667
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
