//! Port definitions (interfaces)
//!
//! Ports define the boundary between the orchestration core and external
//! systems. Each port is a trait implemented by an adapter in the
//! infrastructure layer.

mod dispatch;

pub use dispatch::Dispatch;
