//! # Script Verification Service
//!
//! Application service layer that implements the `ScriptVerificationApi` trait.
//! Callers that check many inputs fan out over this service themselves.

use crate::domain::errors::ScriptError;
use crate::domain::interpreter;
use crate::ports::inbound::ScriptVerificationApi;
use shared_types::{Transaction, TxOut};
use tracing::trace;

/// Script Verification Service.
///
/// Stateless; cheap to clone and share across threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptVerificationService;

impl ScriptVerificationService {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptVerificationApi for ScriptVerificationService {
    fn verify_input(
        &self,
        tx: &Transaction,
        input_index: usize,
        spent: &TxOut,
    ) -> Result<(), ScriptError> {
        interpreter::verify_input(tx, input_index, spent).inspect_err(|err| {
            trace!(txid = %tx.txid(), input_index, %err, "input verification failed");
        })
    }
}
