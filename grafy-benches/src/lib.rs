//! Benchmark support crate for grafy.
//!
//! Provides synthetic run logs and parameter types used by the Criterion
//! benchmarks for corpus generation, log parsing and chart rendering.

pub mod error;
pub mod params;
pub mod source;
