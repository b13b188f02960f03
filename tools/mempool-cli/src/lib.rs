//! # Mempool CLI
//!
//! Runs one admission pass over a JSON fixture and reports the result.

pub mod fixture;
pub mod runner;

pub use fixture::Fixture;
pub use runner::{run, CliVerifier};
