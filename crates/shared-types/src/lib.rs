//! # Shared Types Crate
//!
//! Transaction data model shared across the ledger node.
//!
//! ## Design Principles
//!
//! - **Two identities**: every transaction carries a [`Txid`] (excludes witness
//!   data, used for spend references) and a [`Wtxid`] (includes it). They are
//!   distinct types so one can never be passed where the other is expected.
//! - **Derived metrics**: sizes, weight and virtual size are computed once from
//!   the consensus encoding when a [`Transaction`] is built and cached.
//! - **Immutability**: a [`Transaction`] cannot be modified after construction;
//!   build a [`MutableTransaction`] and convert it.

pub mod encoding;
pub mod entities;
pub mod errors;
pub mod hashes;
pub mod script;

pub use entities::*;
pub use errors::*;
pub use hashes::{pubkey_hash, sha256d, PubKeyHash, Txid, Wtxid};
pub use script::{Instruction, Script, ScriptType};
