//! Default target addresses for a local deployment.

use libris_domain::{DomainResult, Targets};

/// Auth gateway base address.
pub const DEFAULT_AUTH_URL: &str = "http://localhost:8080";
/// Book service base address.
pub const DEFAULT_BOOK_URL: &str = "http://localhost:8081";
/// User service base address.
pub const DEFAULT_USER_URL: &str = "http://localhost:8082";
/// Loan SOAP service endpoint.
pub const DEFAULT_LOAN_URL: &str = "http://localhost:8083/loan";

/// Builds the validated target set from address strings.
///
/// # Errors
///
/// Returns an error if any address fails to parse as a URL.
pub fn targets(
    auth_url: &str,
    book_url: &str,
    user_url: &str,
    loan_url: &str,
) -> DomainResult<Targets> {
    Targets::from_strs(auth_url, book_url, user_url, loan_url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addresses_parse() {
        let targets = targets(
            DEFAULT_AUTH_URL,
            DEFAULT_BOOK_URL,
            DEFAULT_USER_URL,
            DEFAULT_LOAN_URL,
        )
        .unwrap();
        assert_eq!(targets.loan_endpoint.path(), "/loan");
    }
}
