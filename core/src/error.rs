//! Error types for the dispatcher.
//!
//! # Design
//! Two layers of failure are kept apart. `TransportError` travels *inside* a
//! `Response` and describes why no usable HTTP response was obtained; an HTTP
//! 4xx/5xx is never one of these. `DispatchError` is returned by the
//! dispatcher's own API when a request cannot be submitted or its result can
//! no longer be observed.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure to obtain an HTTP response for one attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The method, URL or headers could not form a valid request.
    #[error("invalid request: {0}")]
    Construction(String),

    /// Connection, TLS, timeout or protocol failure reported by the agent.
    #[error("request failed: {0}")]
    Request(#[from] ureq::Error),

    /// The response body could not be read to the end.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether another attempt could succeed. A request that cannot be built
    /// will fail identically every time.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransportError::Construction(_))
    }

    /// Split agent errors into construction problems and everything else.
    pub(crate) fn from_agent(err: ureq::Error) -> Self {
        match err {
            ureq::Error::BadUri(msg) => TransportError::Construction(msg),
            ureq::Error::Http(e) => TransportError::Construction(e.to_string()),
            other => TransportError::Request(other),
        }
    }
}

/// Errors returned by `Dispatcher`, `Submitter` and `Pending`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The dispatch loop is no longer accepting requests.
    #[error("dispatcher is stopped")]
    Stopped,

    /// The request was dropped without a result, e.g. discarded at shutdown.
    #[error("request abandoned before a response was produced")]
    Abandoned,

    /// No result arrived within the caller's deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("failed to spawn dispatch worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("dispatch worker panicked")]
    WorkerPanicked,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating `DispatcherConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
