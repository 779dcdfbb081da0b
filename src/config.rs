//! Configuration management for the chat server
//!
//! Values come from built-in defaults, an optional `config.toml` in the working
//! directory, and `CHAT_SERVER_*` environment variables, in increasing precedence.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ServerError;

const DEFAULT_BIND_ADDRESS: &str = "localhost";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_CLIENTS: usize = 64;
const DEFAULT_MAX_LINE_LENGTH: usize = 1024;
const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Server configuration, loaded once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host name or IP address the listener binds to
    /// Environment: CHAT_SERVER_BIND_ADDRESS
    pub bind_address: String,

    /// TCP port for client connections
    /// Environment: CHAT_SERVER_PORT
    pub port: u16,

    /// Maximum concurrently attached connections
    /// Environment: CHAT_SERVER_MAX_CLIENTS
    pub max_clients: usize,

    /// Longest accepted command line in bytes, terminator included
    /// Environment: CHAT_SERVER_MAX_LINE_LENGTH
    pub max_line_length: usize,

    /// Lines queued per connection before further lines to it are dropped
    /// Environment: CHAT_SERVER_OUTBOX_CAPACITY
    pub outbox_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, `config.toml` and the environment.
    pub fn load() -> Result<Self, ServerError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)?
            .set_default("max_line_length", DEFAULT_MAX_LINE_LENGTH as i64)?
            .set_default("outbox_capacity", DEFAULT_OUTBOX_CAPACITY as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CHAT_SERVER").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "bind_address cannot be empty".into(),
            ));
        }

        if self.max_clients == 0 {
            return Err(config::ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(config::ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        if self.outbox_capacity == 0 {
            return Err(config::ConfigError::Message(
                "outbox_capacity must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
