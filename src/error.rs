//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Gateway error type.
///
/// Every variant is terminal for the current request. Upstream detail is
/// carried for logging only; `IntoResponse` emits a short generic message.
#[derive(Debug)]
pub enum Error {
    /// `frame` query parameter missing — the action cannot be routed.
    FrameNotFound,
    /// The verifier reported the action message invalid.
    InvalidMessage,
    /// Decoded message carried no button index.
    ButtonNotFound,
    /// Gated route hit without a usable `fid` query parameter.
    MissingActor,
    /// Verification upstream unreachable or returned garbage.
    Verifier(String),
    /// Social graph lookup failed.
    Graph(String),
    /// Next-frame resolution failed.
    Resolver(String),
    /// Configuration error.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::FrameNotFound => write!(f, "frame not found"),
            Error::InvalidMessage => write!(f, "invalid frame message"),
            Error::ButtonNotFound => write!(f, "button not found"),
            Error::MissingActor => write!(f, "missing or invalid fid"),
            Error::Verifier(msg) => write!(f, "verifier error: {msg}"),
            Error::Graph(msg) => write!(f, "social graph error: {msg}"),
            Error::Resolver(msg) => write!(f, "resolver error: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Upstream detail stays in the logs; callers get the short form.
        let (status, body) = match &self {
            Error::FrameNotFound => (StatusCode::NOT_FOUND, "Frame not found"),
            Error::InvalidMessage => (StatusCode::BAD_REQUEST, "Invalid frame message"),
            Error::ButtonNotFound => (StatusCode::NOT_FOUND, "Button not found"),
            Error::MissingActor => (StatusCode::BAD_REQUEST, "Missing or invalid fid"),
            Error::Verifier(_) => (StatusCode::BAD_GATEWAY, "Message verification unavailable"),
            Error::Graph(_) => (StatusCode::BAD_GATEWAY, "Social graph unavailable"),
            Error::Resolver(_) => (StatusCode::BAD_GATEWAY, "Frame resolution failed"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Gateway misconfigured"),
        };
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::FrameNotFound, StatusCode::NOT_FOUND),
            (Error::InvalidMessage, StatusCode::BAD_REQUEST),
            (Error::ButtonNotFound, StatusCode::NOT_FOUND),
            (Error::MissingActor, StatusCode::BAD_REQUEST),
            (Error::Verifier("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Graph("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Resolver("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_display_carries_detail_for_logs() {
        let err = Error::Graph("connection refused".into());
        assert_eq!(err.to_string(), "social graph error: connection refused");
    }
}
