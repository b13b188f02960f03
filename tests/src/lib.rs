//! # Ledger Node Test Suite
//!
//! Cross-crate scenarios for the admission engine, run against the real
//! script verifier and the in-memory chain state.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Admission scenarios
//! │   ├── package_properties.rs
//! │   ├── replacement.rs
//! │   ├── pool_maintenance.rs
//! │   ├── concurrency.rs
//! │   └── signed_flow.rs
//! └── benches/           # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # One group
//! cargo test -p ledger-tests integration::replacement::
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

pub mod integration;
