//! Error types for the API client pipeline.
//!
//! # Design
//! Every call ends in exactly one terminal outcome. Network-level problems
//! (DNS, refused connection, TLS, bad transport option) land in `Transport`
//! and never carry a status code. Any response with status >= 400 lands in
//! `HttpStatus` regardless of 4xx/5xx class. `Decode` and `Encode` cover the
//! JSON and form boundaries on either side of the wire.

use thiserror::Error;

/// Errors returned by `ApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a status code >= 400.
    ///
    /// `message` is the body's `message` field when the body is a JSON object
    /// carrying one, otherwise the raw body.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: u16,
        message: String,
        body: String,
    },

    /// A successful response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The request body could not be encoded for its content type.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

/// Discriminant of [`ApiError`] for callers that only care about the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    HttpStatus,
    Decode,
    Encode,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Encode(_) => ErrorKind::Encode,
        }
    }

    /// HTTP status code, present only for `HttpStatus`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Diagnostic reported by a [`Transport`](crate::transport::Transport)
/// implementation when no HTTP response was obtained.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::Transport(err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_display_includes_code_and_message() {
        let err = ApiError::HttpStatus {
            status: 404,
            message: "not found".to_string(),
            body: r#"{"message":"not found"}"#.to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
    }

    #[test]
    fn transport_error_converts_without_status() {
        let err: ApiError = TransportError::new("connection refused").into();
        assert!(matches!(err, ApiError::Transport(ref msg) if msg == "connection refused"));
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
