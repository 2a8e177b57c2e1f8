//! Dispatch implementation using reqwest.
//!
//! This adapter implements the `Dispatch` port using the reqwest library.
//! It handles all HTTP and SOAP-over-HTTP traffic for the harness.

use std::time::Duration;

use async_trait::async_trait;
use libris_application::Dispatch;
use libris_domain::{FailureKind, HttpMethod, Outcome, RequestSpec};
use reqwest::{Client, Method};
use tracing::debug;

/// Error building the underlying client.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The reqwest client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Dispatch adapter wrapping `reqwest::Client`.
///
/// One client is shared across every request of a run; each request
/// carries its own bounded wait. Transport conditions never
/// surface as errors here: they are classified into the returned
/// [`Outcome`].
pub struct ReqwestDispatcher {
    client: Client,
}

impl ReqwestDispatcher {
    /// Creates a dispatcher with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, DispatchError> {
        let client = Client::builder()
            .user_agent("Libris/0.1.0")
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| DispatchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a dispatcher with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Classifies a reqwest error into a transport failure kind.
    fn classify(error: &reqwest::Error) -> FailureKind {
        if error.is_timeout() {
            return FailureKind::Timeout;
        }
        if error.is_connect() {
            return FailureKind::ConnectionError;
        }
        FailureKind::Transport(error.to_string())
    }
}

#[async_trait]
impl Dispatch for ReqwestDispatcher {
    async fn dispatch(&self, request: &RequestSpec) -> Outcome {
        let url = request.target.url();
        debug!(method = %request.target.method, %url, "dispatching");

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.target.method), url.clone())
            .timeout(Duration::from_millis(request.timeout_ms));

        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }

        // Content-Type from the body kind, unless a header already set it.
        if let Some(content_type) = request.body.content_type() {
            let has_content_type = request
                .headers
                .iter()
                .any(|h| h.name.eq_ignore_ascii_case("content-type"));
            if !has_content_type {
                builder = builder.header("Content-Type", content_type);
            }
        }

        if let Some(wire_body) = request.body.to_wire() {
            builder = builder.body(wire_body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = Self::classify(&e);
                debug!(%url, failure = %kind, "dispatch failed");
                return match kind {
                    FailureKind::Timeout => Outcome::timeout(),
                    FailureKind::ConnectionError => Outcome::connection_error(),
                    FailureKind::Transport(message) => Outcome::transport(message),
                };
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Outcome::received(status, body),
            Err(e) => Outcome::transport(format!("failed to read body: {e}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use libris_domain::{EndpointTarget, Targets};

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestDispatcher::to_reqwest_method(HttpMethod::Delete),
            Method::DELETE
        );
    }

    #[test]
    fn test_client_creation() {
        let dispatcher = ReqwestDispatcher::new();
        assert!(dispatcher.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_target_yields_failure_outcome() {
        let dispatcher = ReqwestDispatcher::new().unwrap();
        // Port 1 is never listening locally; the connection is refused.
        let targets = Targets::from_strs(
            "http://127.0.0.1:1",
            "http://127.0.0.1:1",
            "http://127.0.0.1:1",
            "http://127.0.0.1:1/loan",
        )
        .unwrap();
        let request = RequestSpec::new(EndpointTarget::rest(
            HttpMethod::Get,
            &targets.book_base,
            "/api/books",
        ))
        .with_timeout_ms(2_000);

        let outcome = dispatcher.dispatch(&request).await;

        assert!(!outcome.is_received());
        assert!(outcome.status().is_none());
        assert!(outcome.failure().is_some());
    }
}
