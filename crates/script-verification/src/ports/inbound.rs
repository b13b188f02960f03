//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this crate.

use crate::domain::errors::ScriptError;
use shared_types::{Transaction, TxOut};

/// Primary Script Verification API.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait ScriptVerificationApi: Send + Sync {
    /// Verify a single input against the output it spends.
    fn verify_input(
        &self,
        tx: &Transaction,
        input_index: usize,
        spent: &TxOut,
    ) -> Result<(), ScriptError>;
}
