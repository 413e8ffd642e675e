//! Shared test utilities used across tiscan crates.

pub mod profile;
pub mod tracing;
