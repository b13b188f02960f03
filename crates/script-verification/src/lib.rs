//! # Script Verification
//!
//! Verifies that each input of a transaction satisfies the spending
//! condition of the output it consumes.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): sighash computation, ECDSA checks and the
//!   template interpreter. Pure functions, no I/O.
//! - **Ports Layer** (`ports/`): the `ScriptVerificationApi` trait.
//! - **Service Layer** (`service.rs`): wires domain logic to the port.
//!
//! ## Supported Templates
//!
//! | Template | Unlocking data |
//! |----------|----------------|
//! | Pay-to-pubkey-hash | `script_sig = <sig> <pubkey>`, empty witness |
//! | Witness v0 pubkey-hash | empty `script_sig`, `witness = [sig, pubkey]` |
//!
//! Any other template fails verification.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention**: signatures with high S values are rejected
//! - Signatures commit to every input outpoint, every output, and the value
//!   and script of the output being spent

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::entities::{Keypair, SIGHASH_ALL};
pub use domain::errors::ScriptError;
pub use domain::interpreter::verify_input;
pub use domain::sighash::signature_hash;
pub use domain::signer::sign_input;
pub use ports::inbound::ScriptVerificationApi;
pub use service::ScriptVerificationService;
