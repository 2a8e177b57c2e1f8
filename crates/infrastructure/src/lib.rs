//! Libris Infrastructure - adapters and terminal reporting
//!
//! The outermost layer: the reqwest-backed implementation of the
//! [`Dispatch`](libris_application::Dispatch) port, and the terminal
//! reporter that renders assertion ledgers and highlighted XML.

pub mod adapters;
pub mod reporting;

pub use adapters::{DispatchError, ReqwestDispatcher};
pub use reporting::Reporter;
