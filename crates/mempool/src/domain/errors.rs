//! Mempool error types.
//!
//! Expected rejections are verdicts (see `verdict`), not errors. The types
//! here cover contract violations and internal pool inconsistencies.

use super::verdict::AdmissionStage;
use shared_types::{OutPoint, Txid};
use thiserror::Error;

/// Pool mutation errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Transaction (or its witness hash) already exists in the pool.
    #[error("transaction {0} already in pool")]
    AlreadyExists(Txid),

    /// Transaction not found in the pool.
    #[error("transaction {0} not in pool")]
    NotFound(Txid),

    /// A declared parent is not in the pool.
    #[error("parent {parent} of {txid} not in pool")]
    MissingParent { txid: Txid, parent: Txid },

    /// Another pool entry already spends this outpoint.
    #[error("outpoint {0} already spent in pool")]
    OutpointAlreadySpent(OutPoint),
}

/// Contract violations surfaced by the admission controller.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// Packages must contain at least one transaction.
    #[error("empty package")]
    EmptyPackage,

    #[error("invalid admission stage transition {from:?} -> {to:?}")]
    InvalidStageTransition {
        from: AdmissionStage,
        to: AdmissionStage,
    },

    /// The validated package could not be applied; the pool was restored.
    #[error("commit failed: {0}")]
    Commit(#[from] PoolError),
}

/// Invalid configuration values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("{0} must not be negative")]
    NegativeFeeRate(&'static str),
}
