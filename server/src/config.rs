//! Process configuration for the game server

use std::time::Duration;
use thiserror::Error;

/// Problems found while building a [`ServerConfig`] or its word list
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("word {0:?} must be 1-255 ASCII letters")]
    InvalidWord(String),
    #[error("word list is empty")]
    EmptyWordList,
    #[error("cannot read word file {path}: {source}")]
    WordFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Settings the server loop runs with
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_addr: String,
    /// Games allowed in an active turn state before new connections are refused
    pub max_active_games: usize,
    /// Upper bound on one readiness wait; matchmaking and reaping run at least this often
    pub poll_interval: Duration,
    /// Ends games whose connection has been silent this long. `None` disables it.
    pub idle_timeout: Option<Duration>,
    /// Largest number of unparsed bytes kept per connection
    pub max_buffer: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_active_games == 0 {
            return Err(ConfigError::Zero("max_active_games"));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::Zero("poll_interval"));
        }
        if self.max_buffer == 0 {
            return Err(ConfigError::Zero("max_buffer"));
        }
        if matches!(self.idle_timeout, Some(timeout) if timeout.is_zero()) {
            return Err(ConfigError::Zero("idle_timeout"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:9001".to_string(),
            max_active_games: 3,
            poll_interval: Duration::from_secs(5),
            idle_timeout: None,
            max_buffer: 4096,
        }
    }
}
