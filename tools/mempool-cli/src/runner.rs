//! Builds a service from a fixture and runs the package through it.

use std::sync::Arc;

use anyhow::{bail, Result};
use mempool::{
    MempoolConfig, PackageAdmissionApi, PackageAdmissionService, PackageResult, ScriptVerifier,
    StandardVerifierAdapter, ValidationMode,
};
use shared_types::{Transaction, TxOut};
use tracing::info;

use crate::fixture::Fixture;

/// Script checking used by the CLI.
#[derive(Clone, Debug)]
pub enum CliVerifier {
    /// Verify signatures.
    Standard(StandardVerifierAdapter),
    /// Accept every script; for fixtures without real signatures.
    Skip,
}

impl ScriptVerifier for CliVerifier {
    fn verify_script(&self, tx: &Transaction, input_index: usize, spent: &TxOut) -> bool {
        match self {
            Self::Standard(adapter) => adapter.verify_script(tx, input_index, spent),
            Self::Skip => true,
        }
    }
}

/// Preloads the fixture's pool transactions, then runs its package in `mode`.
pub fn run(
    fixture: &Fixture,
    config: MempoolConfig,
    verifier: CliVerifier,
    mode: ValidationMode,
) -> Result<PackageResult> {
    let service = PackageAdmissionService::new(
        config,
        Arc::new(fixture.chain_state()),
        Arc::new(verifier),
    );

    for tx in &fixture.mempool {
        let result = service.accept_transaction(Arc::new(tx.clone()), false)?;
        if !result.is_valid() {
            let reason = result
                .get(&tx.wtxid())
                .and_then(|verdict| verdict.reject_reason())
                .unwrap_or("unknown");
            bail!("Preloaded transaction {} rejected: {}", tx.txid(), reason);
        }
    }
    info!(preloaded = service.pool_size(), "fixture pool ready");

    Ok(service.admit(&fixture.package(), mode)?)
}
