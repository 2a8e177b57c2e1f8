//! Shared scenario state
//!
//! Mutable state carried between the steps of one scenario: the auth
//! token and the identifiers of entities created along the way. Owned by
//! the scenario runner and passed by reference into each step; steps run
//! strictly one at a time, so no synchronization is involved. Everything
//! here lives for one run only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cross-step mutable state for one scenario run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioState {
    /// JWT obtained from a successful login.
    pub token: Option<String>,
    /// Username registered by this run, for duplicate/login steps.
    pub registered_username: Option<String>,
    /// Ids of books created by this run, in creation order.
    pub created_book_ids: Vec<i64>,
    /// Ids of users created by this run, in creation order.
    pub created_user_ids: Vec<i64>,
    /// Id of the loan created by this run.
    pub created_loan_id: Option<String>,
    /// Id of the loan this run returned, for the duplicate-return step.
    pub returned_loan_id: Option<String>,
}

impl ScenarioState {
    /// Creates empty state for a fresh run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            token: None,
            registered_username: None,
            created_book_ids: Vec::new(),
            created_user_ids: Vec::new(),
            created_loan_id: None,
            returned_loan_id: None,
        }
    }
}

/// Which tier of the id-resolution policy produced an identifier.
///
/// Steps that need an entity created earlier resolve it in three tiers:
/// the stored id from state, then a secondary lookup against the backend,
/// then a hardcoded default. The tier is surfaced in diagnostics; the
/// defaults can collide with unrelated persisted data, which is a known
/// test-isolation hazard rather than something to paper over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// The id stored by an earlier step.
    Stored,
    /// Found via a secondary lookup (e.g. search by known attribute).
    Lookup,
    /// The hardcoded fallback.
    Default,
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stored => write!(f, "stored id"),
            Self::Lookup => write!(f, "secondary lookup"),
            Self::Default => write!(f, "hardcoded default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state_is_empty() {
        let state = ScenarioState::new();
        assert!(state.token.is_none());
        assert!(state.created_book_ids.is_empty());
        assert!(state.created_loan_id.is_none());
    }
}
