//! Endpoint targeting types
//!
//! An [`EndpointTarget`] names one callable endpoint of the backend under
//! test: protocol, base address, path, and HTTP method. [`Targets`] holds
//! the full set of base addresses for one run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Wire protocol of a service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    /// Plain HTTP with JSON bodies.
    Rest,
    /// HTTP POST carrying an envelope-wrapped XML payload.
    Soap,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rest => write!(f, "REST"),
            Self::Soap => write!(f, "SOAP"),
        }
    }
}

/// HTTP methods used by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    Get,
    /// HTTP POST method
    Post,
    /// HTTP PUT method
    Put,
    /// HTTP DELETE method
    Delete,
}

impl HttpMethod {
    /// Returns whether this method typically carries a request body.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    /// Returns the method as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(DomainError::UnsupportedMethod(other.to_string())),
        }
    }
}

/// One callable endpoint: protocol, base address, path, and method.
///
/// Immutable per call; a fresh target is built for every dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTarget {
    /// Wire protocol of the endpoint.
    pub protocol: Protocol,
    /// Base address of the service (scheme, host, port).
    pub base: Url,
    /// Path relative to the base, may include a query string.
    pub path: String,
    /// HTTP method for the call.
    pub method: HttpMethod,
}

impl EndpointTarget {
    /// Creates a REST target.
    #[must_use]
    pub fn rest(method: HttpMethod, base: &Url, path: impl Into<String>) -> Self {
        Self {
            protocol: Protocol::Rest,
            base: base.clone(),
            path: path.into(),
            method,
        }
    }

    /// Creates a SOAP target. SOAP operations always POST to the service
    /// endpoint itself.
    #[must_use]
    pub fn soap(endpoint: &Url) -> Self {
        Self {
            protocol: Protocol::Soap,
            base: endpoint.clone(),
            path: String::new(),
            method: HttpMethod::Post,
        }
    }

    /// Resolves the full request URL by joining base and path.
    ///
    /// An empty path yields the base address unchanged. A path that fails
    /// to join is reported and the call falls back to the base address, so
    /// the affected step fails visibly at its status assertion instead of
    /// panicking mid-run.
    #[must_use]
    pub fn url(&self) -> Url {
        if self.path.is_empty() {
            return self.base.clone();
        }
        match self.base.join(&self.path) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    base = %self.base,
                    path = %self.path,
                    error = %e,
                    "malformed path, dispatching to the base address"
                );
                self.base.clone()
            }
        }
    }
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url())
    }
}

/// Base addresses of all collaborator services for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    /// Auth gateway base address.
    pub auth_base: Url,
    /// Book REST service base address.
    pub book_base: Url,
    /// User REST service base address.
    pub user_base: Url,
    /// Loan SOAP service endpoint (the operation URL, not a base).
    pub loan_endpoint: Url,
}

impl Targets {
    /// Builds a target set from string addresses, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidUrl`] if any address fails to parse.
    pub fn from_strs(
        auth_base: &str,
        book_base: &str,
        user_base: &str,
        loan_endpoint: &str,
    ) -> DomainResult<Self> {
        let parse =
            |raw: &str| Url::parse(raw).map_err(|e| DomainError::InvalidUrl(format!("{e}: {raw}")));
        Ok(Self {
            auth_base: parse(auth_base)?,
            book_base: parse(book_base)?,
            user_base: parse(user_base)?,
            loan_endpoint: parse(loan_endpoint)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_from_str() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_has_body() {
        assert!(!HttpMethod::Get.has_body());
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }

    #[test]
    fn test_target_url_join() {
        let base = Url::parse("http://localhost:8081").unwrap();
        let target = EndpointTarget::rest(HttpMethod::Get, &base, "/api/books?page=1&limit=2");
        assert_eq!(
            target.url().as_str(),
            "http://localhost:8081/api/books?page=1&limit=2"
        );
    }

    #[test]
    fn test_malformed_path_falls_back_to_base() {
        let base = Url::parse("http://localhost:8081").unwrap();
        // A network-path reference with an out-of-range port cannot join.
        let target = EndpointTarget::rest(HttpMethod::Get, &base, "//localhost:99999999999");
        assert_eq!(target.url(), base);
    }

    #[test]
    fn test_soap_target_uses_endpoint_directly() {
        let endpoint = Url::parse("http://localhost:8083/loan").unwrap();
        let target = EndpointTarget::soap(&endpoint);
        assert_eq!(target.method, HttpMethod::Post);
        assert_eq!(target.url(), endpoint);
    }

    #[test]
    fn test_targets_reject_bad_url() {
        let result = Targets::from_strs("not a url", "http://b", "http://u", "http://l");
        assert!(result.is_err());
    }
}
