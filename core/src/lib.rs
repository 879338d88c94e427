//! Serialized request dispatcher for an Elasticsearch-like document store.
//!
//! # Overview
//! Callers build a `Request` envelope, submit it, and block on the returned
//! `Pending` handle. A single worker thread pulls envelopes off a shared
//! queue, performs the HTTP call, retries transport failures with a fixed
//! backoff, and writes exactly one `Response` back to each caller.
//!
//! # Design
//! - One worker per `Dispatcher`: no two HTTP calls from the same dispatcher
//!   ever overlap. Retries re-enqueue at the tail and the worker sleeps for
//!   the backoff before servicing anything else.
//! - HTTP 4xx/5xx are results, not errors. Only failures to obtain a
//!   response (`TransportError`) are retried.
//! - Shutdown is a two-way handshake over one rendezvous channel.
//! - The network sits behind the `Transport` trait; `UreqTransport` is the
//!   blocking production implementation.

pub mod config;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod http;
pub mod path;
pub mod transport;
mod worker;

pub use config::DispatcherConfig;
pub use dispatcher::{Dispatcher, Submitter};
pub use envelope::{Pending, Request};
pub use error::{ConfigError, DispatchError, TransportError};
pub use http::{Body, Response};
pub use transport::{Transport, UreqTransport};
