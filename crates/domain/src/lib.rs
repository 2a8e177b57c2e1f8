//! Libris Domain - Core harness types
//!
//! This crate defines the domain model for the Libris conformance harness.
//! All types here are pure Rust with no I/O dependencies: endpoint and
//! request descriptions, normalized dispatch outcomes, the append-only
//! assertion ledger, shared scenario state, and the pure response
//! inspection functions (field extraction and XML formatting).

pub mod assertion;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod outcome;
pub mod request;
pub mod state;
pub mod xml;

pub use assertion::{
    AssertionRecord, Expectation, Ledger, Observed, RunSummary, StatusExpectation,
};
pub use endpoint::{EndpointTarget, HttpMethod, Protocol, Targets};
pub use error::{DomainError, DomainResult};
pub use extract::{extract_field, Encoding};
pub use outcome::{reason_phrase, FailureKind, Outcome};
pub use request::{Header, RequestBody, RequestSpec, DEFAULT_TIMEOUT_MS};
pub use state::{ResolutionTier, ScenarioState};
pub use xml::{XmlLine, XmlSpan, XmlSpanKind};
