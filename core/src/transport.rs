//! Blocking HTTP transport used by the dispatch loop.
//!
//! # Design
//! `Transport` is the only place the loop touches the network, so tests can
//! swap in a closure that scripts outcomes. `UreqTransport` disables ureq's
//! status-as-error behavior: 4xx/5xx come back as data and only failures to
//! obtain a response become `TransportError`.

use std::io::Read;
use std::time::Duration;

use tracing::{debug, error};
use ureq::{AsSendBody, SendBody};

use crate::error::TransportError;
use crate::http::{Body, Response};
use crate::path;

/// Performs one HTTP call and reports its outcome.
pub trait Transport: Send + 'static {
    /// Call `method` on `http://{server}{path}`. Never panics on network
    /// failure; the failure is carried in `Response::error`.
    fn call(&self, server: &str, method: &str, path: &str, body: Option<&mut Body>) -> Response;
}

impl<F> Transport for F
where
    F: Fn(&str, &str, &str, Option<&mut Body>) -> Response + Send + 'static,
{
    fn call(&self, server: &str, method: &str, path: &str, body: Option<&mut Body>) -> Response {
        self(server, method, path, body)
    }
}

/// `Transport` backed by a blocking `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    fn send(
        &self,
        method: &str,
        url: &str,
        body: impl AsSendBody,
    ) -> Result<ureq::http::Response<ureq::Body>, TransportError> {
        let request = ureq::http::Request::builder()
            .method(method)
            .uri(url)
            .body(body)
            .map_err(|e| TransportError::Construction(e.to_string()))?;
        self.agent.run(request).map_err(TransportError::from_agent)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn call(&self, server: &str, method: &str, path: &str, body: Option<&mut Body>) -> Response {
        let url = format!("http://{server}{}", path::clean(path));

        let sent = match body {
            None => self.send(method, &url, ()),
            Some(Body::Bytes(bytes)) => self.send(method, &url, bytes.as_slice()),
            Some(Body::Reader(reader)) => self.send(method, &url, SendBody::from_reader(reader.as_mut())),
        };

        let response = match sent {
            Ok(response) => response,
            Err(err) => {
                error!(method, url = %url, error = %err, "request failed");
                return Response::failed(err);
            }
        };

        let status = response.status().as_u16();
        let mut content = Vec::new();
        // The reader owns the connection and returns it to the agent on drop.
        let mut reader = response.into_body().into_reader();
        if let Err(err) = reader.read_to_end(&mut content) {
            error!(method, url = %url, status, error = %err, "failed to read response body");
            return Response {
                status,
                content,
                error: Some(TransportError::Io(err)),
                retries: 0,
            };
        }

        debug!(method, url = %url, status, bytes = content.len(), "request completed");
        Response::new(status, content)
    }
}
