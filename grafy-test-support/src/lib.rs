//! Shared test utilities used across grafy crates.

pub mod logs;
pub mod tracing;
