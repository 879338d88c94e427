//! Request envelopes and their completion handles.
//!
//! # Design
//! `Request::new` returns the envelope together with a `Pending` handle that
//! owns the receiving half of a capacity-1 channel. The envelope travels to
//! the dispatch loop; the handle stays with the caller. `reply` consumes the
//! envelope, so a result can be written at most once.
//!
//! If an envelope is dropped without a reply (the dispatcher stopped while it
//! was still queued), the handle reports `DispatchError::Abandoned` instead
//! of blocking forever. Callers that need a bound on latency use
//! `Pending::wait_timeout`.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;
use uuid::Uuid;

use crate::error::DispatchError;
use crate::http::{Body, Response};

/// One unit of work for the dispatch loop.
#[derive(Debug)]
pub struct Request {
    id: Uuid,
    target: String,
    method: String,
    path: String,
    body: Option<Body>,
    reply: Sender<Response>,
    retries: u64,
}

impl Request {
    pub fn new(
        target: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> (Self, Pending) {
        let (reply, receiver) = bounded(1);
        let id = Uuid::new_v4();
        let request = Self {
            id,
            target: target.into(),
            method: method.into(),
            path: path.into(),
            body: None,
            reply,
            retries: 0,
        };
        (request, Pending { id, receiver })
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn retries(&self) -> u64 {
        self.retries
    }

    pub(crate) fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub(crate) fn bump_retries(&mut self) {
        self.retries += 1;
    }

    /// Deliver the final result to the caller. A caller that already gave up
    /// on the handle is not an error.
    pub(crate) fn reply(self, mut response: Response) {
        response.retries = self.retries;
        if self.reply.send(response).is_err() {
            debug!(request_id = %self.id, "caller dropped the response handle");
        }
    }
}

/// Caller-side handle for a submitted `Request`.
#[derive(Debug)]
pub struct Pending {
    id: Uuid,
    receiver: Receiver<Response>,
}

impl Pending {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Block until the dispatch loop produces the result.
    pub fn wait(self) -> Result<Response, DispatchError> {
        self.receiver.recv().map_err(|_| DispatchError::Abandoned)
    }

    /// Block for at most `timeout`. The handle stays usable after a timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Response, DispatchError> {
        self.receiver.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => DispatchError::Timeout(timeout),
            RecvTimeoutError::Disconnected => DispatchError::Abandoned,
        })
    }
}
