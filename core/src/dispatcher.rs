//! Lifecycle and submission surface of the dispatch loop.
//!
//! # Design
//! `Dispatcher` owns the worker thread and the shutdown signal. `stop`
//! consumes the dispatcher, so the handshake runs exactly once; dropping a
//! dispatcher that was never stopped performs the same handshake.
//!
//! Requests still queued when the loop stops are discarded together with the
//! queue. Their callers see `DispatchError::Abandoned`; the loop never fails
//! them with a synthetic transport error.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use tracing::{debug, info, warn};

use crate::config::DispatcherConfig;
use crate::envelope::{Pending, Request};
use crate::error::DispatchError;
use crate::http::{Body, Response};
use crate::transport::{Transport, UreqTransport};
use crate::worker::{Signal, Worker};

/// Cloneable, thread-safe handle for enqueueing requests.
#[derive(Debug, Clone)]
pub struct Submitter {
    input: Sender<Request>,
}

impl Submitter {
    /// Enqueue `request` without waiting for its result.
    pub fn submit(&self, request: Request) -> Result<(), DispatchError> {
        self.input.send(request).map_err(|_| DispatchError::Stopped)
    }

    /// Enqueue a new request and return its completion handle.
    pub fn send(
        &self,
        target: &str,
        method: &str,
        path: &str,
        body: Option<Body>,
    ) -> Result<Pending, DispatchError> {
        let (mut request, pending) = Request::new(target, method, path);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        self.submit(request)?;
        Ok(pending)
    }
}

/// Serializes every request to one document-store server through a single
/// worker thread.
#[derive(Debug)]
pub struct Dispatcher {
    submitter: Submitter,
    shutdown: Option<Signal>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    /// Start a dispatcher that talks HTTP through `ureq`.
    pub fn start(config: DispatcherConfig) -> Result<Self, DispatchError> {
        let transport = UreqTransport::new(config.request_timeout());
        Self::with_transport(config, transport)
    }

    /// Start a dispatcher over an arbitrary transport.
    pub fn with_transport<T: Transport>(
        config: DispatcherConfig,
        transport: T,
    ) -> Result<Self, DispatchError> {
        config.validate()?;

        let (input, queue) = unbounded();
        let shutdown = Signal::new();
        let name = if config.index.is_empty() {
            "dispatch".to_string()
        } else {
            format!("dispatch-{}", config.index)
        };
        info!(
            server = %config.server,
            index = %config.index,
            max_retries = config.max_retries,
            error_backoff_ms = config.error_backoff_ms,
            "starting dispatcher"
        );

        let worker = Worker::new(config, transport, queue, input.clone(), shutdown.clone());
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || worker.run())
            .map_err(DispatchError::Spawn)?;

        Ok(Self {
            submitter: Submitter { input },
            shutdown: Some(shutdown),
            worker: Some(handle),
        })
    }

    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Enqueue `request`; the caller then waits on its `Pending` handle.
    pub fn submit(&self, request: Request) -> Result<(), DispatchError> {
        self.submitter.submit(request)
    }

    /// Submit a request and block until its result arrives.
    pub fn execute(
        &self,
        target: &str,
        method: &str,
        path: &str,
        body: Option<Body>,
    ) -> Result<Response, DispatchError> {
        self.submitter.send(target, method, path, body)?.wait()
    }

    /// Signal the loop, wait for its acknowledgment, and join the worker.
    pub fn stop(mut self) -> Result<(), DispatchError> {
        self.shutdown_worker()
    }

    fn shutdown_worker(&mut self) -> Result<(), DispatchError> {
        let Some(signal) = self.shutdown.take() else {
            return Ok(());
        };
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };

        if !signal.handshake(&handle) {
            warn!("dispatch loop did not acknowledge shutdown");
        }
        drop(signal);

        handle.join().map_err(|_| DispatchError::WorkerPanicked)?;
        debug!("dispatcher stopped");
        Ok(())
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown_worker() {
            warn!(error = %err, "dispatcher shutdown failed");
        }
    }
}
