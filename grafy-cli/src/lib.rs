//! Support library for the grafy CLI binary.
//!
//! Exposes the command layer, logging setup and the corpus runner so tests
//! can drive commands without spawning the binary.

pub mod cli;
pub mod logging;
pub mod runner;
