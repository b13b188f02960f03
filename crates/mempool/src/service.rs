//! # Package Admission Service
//!
//! Orchestrates one admission pass per call:
//!
//! ```text
//! sanitize (no lock) → lock pool → validate members in order → stage, trim → keep | undo → unlock
//! ```
//!
//! ## Atomicity
//!
//! Members are validated against a [`PackageView`] and never touch the pool.
//! Once every member has passed, the staged entries are applied through a
//! [`StagedCommit`] and the pool is trimmed to its size limit. The commit is
//! undone, trimmed entries included, when an insertion fails, when the trim
//! evicts a member (`mempool full`), or when the call is a dry run. Either
//! every member is admitted or none is.
//!
//! ## Thread Safety
//!
//! The service is `Send + Sync` and meant to be shared behind `Arc`. Calls
//! from different threads are totally ordered by the pool lock; the lock is
//! held from the first validation until the verdict is built.

use std::collections::BTreeMap;
use std::sync::Arc;

use shared_types::{Package, Transaction, Txid};
use tracing::{debug, info, info_span, warn};

use crate::domain::{
    sanitize, validate, AdmissionError, AdmissionStage, MempoolConfig, PackageLimits,
    PackageResult, PackageVerdict, PackageView, PoolStatus, RejectReason, ResultKind,
    StagedCommit, TxRejection, ValidationContext, ValidationMode,
};
use crate::pool_lock::SharedPool;
use crate::ports::inbound::PackageAdmissionApi;
use crate::ports::outbound::{ChainState, ScriptVerifier};

/// Package admission controller.
///
/// ## Dependencies
///
/// - `C: ChainState` - confirmed UTXO set and tip height
/// - `V: ScriptVerifier` - per-input script checks
pub struct PackageAdmissionService<C, V>
where
    C: ChainState,
    V: ScriptVerifier,
{
    config: MempoolConfig,
    limits: PackageLimits,
    pool: SharedPool,
    chain: Arc<C>,
    verifier: Arc<V>,
}

impl<C, V> PackageAdmissionService<C, V>
where
    C: ChainState,
    V: ScriptVerifier,
{
    /// Creates a service with its own empty pool.
    pub fn new(config: MempoolConfig, chain: Arc<C>, verifier: Arc<V>) -> Self {
        let pool = SharedPool::with_incremental_fee(config.incremental_relay_fee_rate);
        Self::with_pool(config, pool, chain, verifier)
    }

    /// Creates a service over an existing pool handle.
    pub fn with_pool(
        config: MempoolConfig,
        pool: SharedPool,
        chain: Arc<C>,
        verifier: Arc<V>,
    ) -> Self {
        Self {
            limits: PackageLimits::from(&config),
            config,
            pool,
            chain,
            verifier,
        }
    }

    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }

    /// Validates `package` and, in [`ValidationMode::Commit`], admits all of
    /// it or none of it.
    pub fn admit(
        &self,
        package: &[Arc<Transaction>],
        mode: ValidationMode,
    ) -> Result<PackageResult, AdmissionError> {
        if package.is_empty() {
            return Err(AdmissionError::EmptyPackage);
        }
        let span = info_span!(
            "process_package",
            count = package.len(),
            test_accept = mode.is_dry_run()
        );
        let _enter = span.enter();

        let stage = AdmissionStage::Sanitizing;
        if let Err(rejection) = sanitize(package, &self.limits) {
            debug!(
                reason = %rejection.reason,
                detail = %rejection.detail,
                "package rejected"
            );
            stage.advance(AdmissionStage::Done)?;
            return Ok(PackageResult::rejected(rejection.reason));
        }
        let stage = stage.advance(AdmissionStage::Validating)?;

        let mut pool = self.pool.lock();
        let ctx = ValidationContext {
            config: &self.config,
            chain: self.chain.as_ref(),
            verifier: self.verifier.as_ref(),
            tip_height: self.chain.tip_height(),
            allow_replacement: package.len() == 1 && self.config.enable_rbf,
        };

        let mut view = PackageView::new(&pool);
        let mut tx_results = BTreeMap::new();
        let mut worst: Option<ResultKind> = None;
        for tx in package {
            match validate(tx, &view, &ctx) {
                Ok(entry) => {
                    tx_results.insert(tx.wtxid(), entry.verdict());
                    view.stage(entry);
                }
                Err(rejection) => {
                    debug!(
                        txid = %tx.txid(),
                        reason = %rejection.reason,
                        kind = ?rejection.kind(),
                        detail = %rejection.detail,
                        "transaction rejected"
                    );
                    worst = worst.max(Some(rejection.kind()));
                    tx_results.insert(tx.wtxid(), rejection.into_verdict());
                }
            }
        }
        let staged = view.into_staged();

        if let Some(kind) = worst {
            stage
                .advance(AdmissionStage::RollingBack)?
                .advance(AdmissionStage::Done)?;
            return Ok(PackageResult {
                verdict: PackageVerdict::Invalid {
                    reason: RejectReason::TransactionFailed,
                    kind,
                },
                tx_results,
            });
        }

        // Dry runs take the same path and always roll back, so both modes
        // see the same trim.
        let stage = stage.advance(AdmissionStage::Committing)?;
        let mut commit = StagedCommit::new(&mut pool);
        if let Err(err) = staged.iter().try_for_each(|entry| commit.apply(entry)) {
            warn!(%err, "commit failed, restoring pool");
            drop(commit);
            stage
                .advance(AdmissionStage::RollingBack)?
                .advance(AdmissionStage::Done)?;
            return Err(err.into());
        }

        let lost = commit.trim(self.config.max_pool_vsize);
        if !lost.is_empty() {
            drop(commit);
            debug!(lost = lost.len(), "package did not survive trimming");
            stage
                .advance(AdmissionStage::RollingBack)?
                .advance(AdmissionStage::Done)?;
            for tx in package.iter().filter(|tx| lost.contains(&tx.txid())) {
                let rejection =
                    TxRejection::new(RejectReason::MempoolFull, "evicted by size limit");
                tx_results.insert(tx.wtxid(), rejection.into_verdict());
            }
            return Ok(PackageResult {
                verdict: PackageVerdict::Invalid {
                    reason: RejectReason::TransactionFailed,
                    kind: ResultKind::TransactionRejected,
                },
                tx_results,
            });
        }

        if mode.is_dry_run() {
            drop(commit);
            stage
                .advance(AdmissionStage::RollingBack)?
                .advance(AdmissionStage::Done)?;
            return Ok(PackageResult {
                verdict: PackageVerdict::AllValid,
                tx_results,
            });
        }

        let outcome = commit.finish();
        info!(
            accepted = staged.len(),
            replaced = outcome.replaced.len(),
            trimmed = outcome.trimmed.len(),
            pool_size = pool.size(),
            "package committed"
        );
        stage.advance(AdmissionStage::Done)?;

        Ok(PackageResult {
            verdict: PackageVerdict::AllValid,
            tx_results,
        })
    }

    /// Drops transactions confirmed by a new block, evicts pool entries that
    /// conflict with it and decays the rolling minimum fee.
    pub fn remove_for_block(&self, block: &[Arc<Transaction>]) -> Vec<Txid> {
        let mut pool = self.pool.lock();
        let before = pool.size();
        let conflicts = pool.remove_for_block(block);
        debug!(
            confirmed = before - pool.size() - conflicts.len(),
            conflicts = conflicts.len(),
            "block removed from pool"
        );
        conflicts
    }
}

impl<C, V> PackageAdmissionApi for PackageAdmissionService<C, V>
where
    C: ChainState,
    V: ScriptVerifier,
{
    fn process_package(
        &self,
        transactions: Package,
        test_accept: bool,
    ) -> Result<PackageResult, AdmissionError> {
        self.admit(&transactions, ValidationMode::from_test_accept(test_accept))
    }

    fn pool_size(&self) -> usize {
        self.pool.size()
    }

    fn contains(&self, txid: &Txid) -> bool {
        self.pool.lock().contains(txid)
    }

    fn status(&self) -> PoolStatus {
        self.pool.status()
    }
}
