//! Libris Application - Scenario orchestration
//!
//! The layer between the pure domain types and the network adapters: the
//! [`Dispatch`] port that infrastructure implements, and the scenario
//! runner that drives ordered steps against it while threading shared
//! state and the assertion ledger.

pub mod ports;
pub mod scenario;

pub use ports::Dispatch;
pub use scenario::{
    resolve_id, Scenario, ScenarioStatus, Step, StepContext, StepFlow, StepFn, StepFuture,
};
