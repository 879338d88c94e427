//! The dispatch loop: one thread, one request at a time.
//!
//! # Design
//! The loop selects over the inbound queue and the shutdown signal and
//! services exactly one event per iteration. A request whose attempt fails
//! with a retryable transport error is pushed back to the tail of the queue
//! and the loop then sleeps for the fixed backoff, delaying everything queued
//! behind it. Only this thread touches `Request::retries`.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use tracing::{debug, warn};

use crate::config::DispatcherConfig;
use crate::envelope::Request;
use crate::path;
use crate::transport::Transport;

/// How often a blocked handshake checks whether the worker thread has died.
const HANDSHAKE_POLL: Duration = Duration::from_millis(50);

/// Two-way shutdown rendezvous over a single zero-capacity channel.
///
/// The stopping side sends, then receives the worker's acknowledgment on the
/// same channel. Both halves are cloned into the worker, so the channel never
/// disconnects on its own; the handshake polls the worker's liveness instead.
#[derive(Debug, Clone)]
pub(crate) struct Signal {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl Signal {
    pub(crate) fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self { tx, rx }
    }

    /// Ask the worker to stop and wait for its acknowledgment. Returns
    /// `false` if the worker exited without answering.
    pub(crate) fn handshake(&self, worker: &JoinHandle<()>) -> bool {
        loop {
            match self.tx.send_timeout((), HANDSHAKE_POLL) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(())) if !worker.is_finished() => {}
                Err(_) => return false,
            }
        }
        loop {
            match self.rx.recv_timeout(HANDSHAKE_POLL) {
                Ok(()) => return true,
                Err(RecvTimeoutError::Timeout) if !worker.is_finished() => {}
                Err(_) => return false,
            }
        }
    }
}

pub(crate) struct Worker<T> {
    config: DispatcherConfig,
    transport: T,
    input: Receiver<Request>,
    requeue: Sender<Request>,
    shutdown: Signal,
}

impl<T: Transport> Worker<T> {
    pub(crate) fn new(
        config: DispatcherConfig,
        transport: T,
        input: Receiver<Request>,
        requeue: Sender<Request>,
        shutdown: Signal,
    ) -> Self {
        Self {
            config,
            transport,
            input,
            requeue,
            shutdown,
        }
    }

    pub(crate) fn run(self) {
        debug!(index = %self.config.index, server = %self.config.server, "dispatch loop started");
        loop {
            select! {
                recv(self.input) -> request => match request {
                    Ok(request) => self.process(request),
                    // Unreachable while `requeue` keeps the channel open.
                    Err(_) => return,
                },
                recv(self.shutdown.rx) -> _ => {
                    debug!(index = %self.config.index, "shutting down dispatch loop");
                    let _ = self.shutdown.tx.send(());
                    return;
                }
            }
        }
    }

    fn process(&self, mut request: Request) {
        let target = if request.target().is_empty() {
            self.config.index.as_str()
        } else {
            request.target()
        };
        let full_path = path::join(&[target, request.path()]);

        debug!(
            request_id = %request.id(),
            index = %self.config.index,
            target = %target,
            method = %request.method(),
            retries = request.retries(),
            "executing request"
        );

        let method = request.method().to_string();
        let response = self
            .transport
            .call(&self.config.server, &method, &full_path, request.body_mut());

        let retryable = response.error.as_ref().is_some_and(|err| err.is_retryable());
        if retryable && request.retries() < self.config.max_retries {
            request.bump_retries();
            let backoff = self.config.error_backoff();
            warn!(
                request_id = %request.id(),
                path = %full_path,
                retries = request.retries(),
                max_retries = self.config.max_retries,
                backoff_ms = self.config.error_backoff_ms,
                "retrying request"
            );
            if request.body().is_some_and(|body| !body.is_replayable()) {
                warn!(request_id = %request.id(), "retrying with a single-read body that was already consumed");
            }
            if let Err(err) = self.requeue.send(request) {
                // Only possible once the queue has been torn down.
                err.into_inner().reply(response);
                return;
            }
            thread::sleep(backoff);
            return;
        }

        request.reply(response);
    }
}
