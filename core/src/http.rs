//! Request bodies and results exchanged with the dispatch loop.
//!
//! # Design
//! A `Response` is plain data: status, raw bytes, and an optional transport
//! error. The core never interprets the content; an HTTP 404 or 503 is a
//! normal `Response` with `error == None`. Only a failure to obtain a
//! response at all sets `error`, and in that case `status` is 0 unless the
//! headers arrived before the body read failed.

use std::fmt;
use std::io::Read;

use crate::error::TransportError;

/// Payload sent with a request.
pub enum Body {
    /// In-memory bytes, resent unchanged on every attempt.
    Bytes(Vec<u8>),

    /// A single-read stream. Once an attempt has consumed it, a retry sends
    /// whatever is left, usually nothing.
    Reader(Box<dyn Read + Send>),
}

impl Body {
    pub fn reader(reader: impl Read + Send + 'static) -> Self {
        Body::Reader(Box::new(reader))
    }

    /// Whether a retry sends the same payload as the first attempt.
    pub fn is_replayable(&self) -> bool {
        matches!(self, Body::Bytes(_))
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Bytes(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Bytes(text.as_bytes().to_vec())
    }
}

/// Outcome of one dispatched request.
#[derive(Debug)]
pub struct Response {
    /// HTTP status, 0 when the request never produced one.
    pub status: u16,
    pub content: Vec<u8>,
    pub error: Option<TransportError>,
    /// Retries spent before this result was produced.
    pub retries: u64,
}

impl Response {
    pub fn new(status: u16, content: Vec<u8>) -> Self {
        Self {
            status,
            content,
            error: None,
            retries: 0,
        }
    }

    /// A failed attempt that never reached an HTTP response.
    pub fn failed(error: TransportError) -> Self {
        Self {
            status: 0,
            content: Vec::new(),
            error: Some(error),
            retries: 0,
        }
    }

    /// 2xx status and no transport error.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }

    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn string_bodies_are_replayable() {
        assert!(Body::from("{}").is_replayable());
        assert!(Body::from(String::from("{}")).is_replayable());
    }

    #[test]
    fn reader_bodies_are_single_read() {
        let body = Body::reader(io::Cursor::new(b"{}".to_vec()));
        assert!(!body.is_replayable());
        assert_eq!(format!("{body:?}"), "Reader(..)");
    }

    #[test]
    fn http_error_status_is_not_a_failure() {
        let response = Response::new(503, b"unavailable".to_vec());
        assert!(response.error.is_none());
        assert!(!response.is_success());
        assert_eq!(response.content_str(), Some("unavailable"));
    }

    #[test]
    fn failed_response_has_zero_status() {
        let response = Response::failed(TransportError::Construction("bad".to_string()));
        assert_eq!(response.status, 0);
        assert!(response.content.is_empty());
        assert!(!response.is_success());
    }
}
