//! Dispatcher configuration.
//!
//! Fixed at `Dispatcher` construction and never mutated afterwards. Can be
//! built in code with the `with_*` setters or loaded from TOML:
//!
//! ```toml
//! server = "127.0.0.1:9200"
//! index = "orders"
//! error_backoff_ms = 250
//! max_retries = 5
//! request_timeout_ms = 10000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// `host:port` of the document store, without scheme.
    pub server: String,

    /// Default index, used when a request names no target.
    pub index: String,

    /// Fixed delay after a failed attempt before the loop continues.
    pub error_backoff_ms: u64,

    /// Retries allowed per request after the first attempt.
    pub max_retries: u64,

    /// Upper bound on a single HTTP call. `None` waits indefinitely.
    pub request_timeout_ms: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            server: "127.0.0.1:9200".to_string(),
            index: String::new(),
            error_backoff_ms: 500,
            max_retries: 3,
            request_timeout_ms: None,
        }
    }
}

impl DispatcherConfig {
    pub fn new(server: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            index: index.into(),
            ..Self::default()
        }
    }

    /// Stored in whole milliseconds; sub-millisecond parts are dropped and
    /// durations beyond `u64::MAX` ms saturate.
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff_ms = saturating_millis(backoff);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Same millisecond rounding as `with_error_backoff`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(saturating_millis(timeout));
        self
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject values that would let the loop build URLs outside the server.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Invalid("server must not be empty".to_string()));
        }
        if self.server.contains("://") {
            return Err(ConfigError::Invalid(format!(
                "server must be host:port without a scheme, got {:?}",
                self.server
            )));
        }
        if self.server.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "server must not contain a path, got {:?}",
                self.server
            )));
        }
        if self.index.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "index must be a single path segment, got {:?}",
                self.index
            )));
        }
        Ok(())
    }
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
