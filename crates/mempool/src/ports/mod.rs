//! Ports layer for the Mempool subsystem.
//!
//! - **Inbound (Driving)**: `PackageAdmissionApi`
//! - **Outbound (Driven)**: `ChainState`, `ScriptVerifier`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
