//! Request description types
//!
//! A [`RequestSpec`] fully describes one request to dispatch: target,
//! optional body, extra headers, and the bounded wait. Specs are built
//! fresh per call and never mutated after being sent.

use serde::{Deserialize, Serialize};

use crate::endpoint::EndpointTarget;

/// Default bounded wait for a single dispatch, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// One request header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Header name.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an `Authorization: Bearer <token>` header.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        Self::new("Authorization", format!("Bearer {token}"))
    }
}

/// The body of a request, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// A JSON document.
    Json {
        /// The document to serialize.
        value: serde_json::Value,
    },
    /// A SOAP operation payload; wrapped in a `soap:Envelope` on the wire.
    Soap {
        /// The operation element, without the envelope.
        payload: String,
    },
}

impl RequestBody {
    /// Creates a JSON body.
    #[must_use]
    pub const fn json(value: serde_json::Value) -> Self {
        Self::Json { value }
    }

    /// Creates a SOAP body from an operation payload.
    #[must_use]
    pub fn soap(payload: impl Into<String>) -> Self {
        Self::Soap {
            payload: payload.into(),
        }
    }

    /// Returns the content type for this body, if it has one.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Json { .. } => Some("application/json"),
            Self::Soap { .. } => Some("text/xml"),
        }
    }

    /// Renders the body as it goes on the wire: the serialized JSON
    /// document, or the envelope-wrapped SOAP payload.
    #[must_use]
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Json { value } => Some(value.to_string()),
            Self::Soap { payload } => Some(envelope(payload)),
        }
    }
}

/// Wraps a SOAP operation payload in a `soap:Envelope`.
#[must_use]
pub fn envelope(payload: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\">\n\
         \x20 <soap:Body>\n\
         \x20   {payload}\n\
         \x20 </soap:Body>\n\
         </soap:Envelope>"
    )
}

/// A fully described request, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// The endpoint to call.
    pub target: EndpointTarget,
    /// Optional body.
    #[serde(default)]
    pub body: RequestBody,
    /// Extra headers beyond the body's content type.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Bounded wait in milliseconds.
    pub timeout_ms: u64,
}

impl RequestSpec {
    /// Creates a bodyless request with the default timeout.
    #[must_use]
    pub const fn new(target: EndpointTarget) -> Self {
        Self {
            target,
            body: RequestBody::None,
            headers: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Adds a header (builder pattern).
    #[must_use]
    pub fn with_header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    /// Overrides the timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}
