//! Configuration management for the RAX FTP client
//!
//! Built-in defaults, overridden by an optional TOML file and then by
//! `RAX_FTP_CLIENT_*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::protocol::ReplyLimits;

/// Default configuration file name, looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "ftp-client";

/// Client configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Control port used when `open` is given no port
    pub default_port: u16,

    /// Timeout for establishing the control connection
    pub connect_timeout_secs: u64,

    /// Timeout for a single control-channel reply
    pub reply_timeout_secs: u64,

    /// How long to wait for the server to connect back on the data port
    pub data_accept_timeout_secs: u64,

    /// Chunk size for the data-connection byte loop
    pub chunk_size: usize,

    /// Bounds on a single reply
    pub max_reply_line_len: usize,
    pub max_reply_lines: usize,

    /// Range the ephemeral PORT is drawn from
    pub data_port_min: u16,
    pub data_port_max: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: 21,
            connect_timeout_secs: 30,
            reply_timeout_secs: 30,
            data_accept_timeout_secs: 10,
            chunk_size: 1024,
            max_reply_line_len: 2048,
            max_reply_lines: 256,
            data_port_min: 1024,
            data_port_max: 65535,
        }
    }
}

impl ClientConfig {
    /// Load configuration from `ftp-client.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, reading the given file instead of the default one.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .set_default("default_port", defaults.default_port as i64)?
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("reply_timeout_secs", defaults.reply_timeout_secs as i64)?
            .set_default("data_accept_timeout_secs", defaults.data_accept_timeout_secs as i64)?
            .set_default("chunk_size", defaults.chunk_size as i64)?
            .set_default("max_reply_line_len", defaults.max_reply_line_len as i64)?
            .set_default("max_reply_lines", defaults.max_reply_lines as i64)?
            .set_default("data_port_min", defaults.data_port_min as i64)?
            .set_default("data_port_max", defaults.data_port_max as i64)?
            .add_source(file)
            .add_source(Environment::with_prefix("RAX_FTP_CLIENT").try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_port == 0 {
            return Err(ConfigError::Message("default_port cannot be 0".into()));
        }

        if self.connect_timeout_secs == 0
            || self.reply_timeout_secs == 0
            || self.data_accept_timeout_secs == 0
        {
            return Err(ConfigError::Message(
                "timeouts must be greater than 0".into(),
            ));
        }

        if self.chunk_size == 0 {
            return Err(ConfigError::Message(
                "chunk_size must be greater than 0".into(),
            ));
        }

        if self.max_reply_line_len < 8 || self.max_reply_lines == 0 {
            return Err(ConfigError::Message("reply limits are too small".into()));
        }

        if self.data_port_min < 1024 {
            return Err(ConfigError::Message(
                "data_port_min must be at least 1024".into(),
            ));
        }

        if self.data_port_min > self.data_port_max {
            return Err(ConfigError::Message(
                "data_port_min must not exceed data_port_max".into(),
            ));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs)
    }

    pub fn data_accept_timeout(&self) -> Duration {
        Duration::from_secs(self.data_accept_timeout_secs)
    }

    pub fn reply_limits(&self) -> ReplyLimits {
        ReplyLimits {
            max_line_len: self.max_reply_line_len,
            max_lines: self.max_reply_lines,
        }
    }

    pub fn data_port_range(&self) -> std::ops::RangeInclusive<u16> {
        self.data_port_min..=self.data_port_max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.data_accept_timeout(), Duration::from_secs(10));
        assert_eq!(config.data_port_range(), 1024..=65535);
    }

    #[test]
    fn reject_privileged_data_ports() {
        let config = ClientConfig {
            data_port_min: 80,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_zero_chunk_size() {
        let config = ClientConfig {
            chunk_size: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chunk_size = 4096").unwrap();
        writeln!(file, "data_accept_timeout_secs = 3").unwrap();

        let config = ClientConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.data_accept_timeout_secs, 3);
        assert_eq!(config.default_port, 21);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(ClientConfig::load_from(Some(&path)).is_err());
    }
}
