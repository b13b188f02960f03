//! Bridges the `script-verification` crate to the [`ScriptVerifier`] port.

use crate::ports::outbound::ScriptVerifier;
use script_verification::{ScriptVerificationApi, ScriptVerificationService};
use shared_types::{Transaction, TxOut};

/// Verifies pay-to-pubkey-hash and witness pubkey-hash spends.
#[derive(Clone, Debug, Default)]
pub struct StandardVerifierAdapter {
    service: ScriptVerificationService,
}

impl StandardVerifierAdapter {
    pub fn new(service: ScriptVerificationService) -> Self {
        Self { service }
    }
}

impl ScriptVerifier for StandardVerifierAdapter {
    fn verify_script(&self, tx: &Transaction, input_index: usize, spent: &TxOut) -> bool {
        self.service.verify_input(tx, input_index, spent).is_ok()
    }
}
