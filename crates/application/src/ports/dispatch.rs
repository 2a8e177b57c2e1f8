//! Request dispatch port

use async_trait::async_trait;
use libris_domain::{Outcome, RequestSpec};

/// Sends one request to its target endpoint and classifies the result.
///
/// Implementations hold no per-call state and never fail at the call
/// boundary: every transport condition is folded into the returned
/// [`Outcome`] (connection failure, timeout, other transport error, or a
/// received response regardless of status code). Judging the outcome is
/// the ledger's job, not the dispatcher's.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Dispatches the request with its bounded wait.
    async fn dispatch(&self, request: &RequestSpec) -> Outcome;
}
