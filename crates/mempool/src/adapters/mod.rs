//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.
//!
//! - `chain_state`: in-memory confirmed UTXO set (`ChainState`)
//! - `verifier`: bridge to the `script-verification` crate (`ScriptVerifier`)

pub mod chain_state;
pub mod verifier;

pub use chain_state::InMemoryChainState;
pub use verifier::StandardVerifierAdapter;
