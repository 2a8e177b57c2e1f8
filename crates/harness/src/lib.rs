//! Suite construction and configuration for the Libris harness binary.

pub mod config;
pub mod suites;
