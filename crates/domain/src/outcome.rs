//! Normalized dispatch outcomes
//!
//! An [`Outcome`] is the result of exactly one dispatch attempt: either a
//! received response (status code plus raw body) or a transport-level
//! [`FailureKind`]. Whether the outcome matches an expectation is decided
//! later, by the assertion ledger, never here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::{extract_field, Encoding};

/// Classification of a dispatch attempt that produced no response.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// The target endpoint was unreachable. Expected during local
    /// development; reported distinctly from protocol-level errors.
    #[error("connection error: target unreachable")]
    ConnectionError,

    /// The bounded wait elapsed before a response arrived.
    #[error("request timed out")]
    Timeout,

    /// Any other transport-level failure, with a description.
    #[error("transport error: {0}")]
    Transport(String),
}

/// The normalized result of one dispatched request.
///
/// Invariant: exactly one of "status present" or "failure present" holds.
/// The constructors are the only way to build an `Outcome`, which keeps
/// the invariant by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    status: Option<u16>,
    body: Option<String>,
    failure: Option<FailureKind>,
}

impl Outcome {
    /// A response was received, whatever its status code.
    #[must_use]
    pub fn received(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
            failure: None,
        }
    }

    /// The endpoint was unreachable.
    #[must_use]
    pub const fn connection_error() -> Self {
        Self {
            status: None,
            body: None,
            failure: Some(FailureKind::ConnectionError),
        }
    }

    /// The bounded wait elapsed.
    #[must_use]
    pub const fn timeout() -> Self {
        Self {
            status: None,
            body: None,
            failure: Some(FailureKind::Timeout),
        }
    }

    /// Some other transport failure occurred.
    #[must_use]
    pub fn transport(description: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            failure: Some(FailureKind::Transport(description.into())),
        }
    }

    /// The received status code, absent on transport failure.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// The raw response body, absent on transport failure.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// The failure classification, absent when a response was received.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureKind> {
        self.failure.as_ref()
    }

    /// Whether a response was received at all.
    #[must_use]
    pub const fn is_received(&self) -> bool {
        self.status.is_some()
    }

    /// Extracts a named field from the response body; `None` when there is
    /// no body, the body does not parse, or the field is missing.
    #[must_use]
    pub fn extract(&self, field: &str, encoding: Encoding) -> Option<String> {
        self.body
            .as_deref()
            .and_then(|body| extract_field(body, field, encoding))
    }
}

/// Canonical reason phrase for the status codes the harness encounters.
#[must_use]
pub const fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_received_outcome() {
        let outcome = Outcome::received(201, r#"{"id": 7}"#);
        assert!(outcome.is_received());
        assert_eq!(outcome.status(), Some(201));
        assert_eq!(outcome.failure(), None);
    }

    #[test]
    fn test_failure_outcomes_carry_no_status() {
        for outcome in [
            Outcome::connection_error(),
            Outcome::timeout(),
            Outcome::transport("tls handshake failed"),
        ] {
            assert!(!outcome.is_received());
            assert_eq!(outcome.status(), None);
            assert!(outcome.failure().is_some());
        }
    }

    #[test]
    fn test_extract_from_received_body() {
        let outcome = Outcome::received(200, r#"{"token": "abc.def.ghi"}"#);
        assert_eq!(
            outcome.extract("token", Encoding::Json).unwrap(),
            "abc.def.ghi"
        );
        assert_eq!(outcome.extract("missing", Encoding::Json), None);
    }

    #[test]
    fn test_extract_from_failure_is_absent() {
        assert_eq!(
            Outcome::connection_error().extract("token", Encoding::Json),
            None
        );
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(502), "Bad Gateway");
        assert_eq!(reason_phrase(299), "Unknown");
    }
}
