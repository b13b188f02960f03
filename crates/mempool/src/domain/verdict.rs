//! # Verdict Model
//!
//! Result types reported at transaction and package granularity.
//!
//! ## Failure Kinds
//!
//! | Kind | Meaning | Relay handling |
//! |------|---------|----------------|
//! | `PolicyViolation` | Package shape rejected before any per-tx work | Reject, may resubmit smaller |
//! | `TransactionRejected` | Member failed local policy or is not yet connectable | Reject, may resubmit |
//! | `ConsensusViolation` | Would be invalid in a block | Reject, never re-request |
//!
//! Reason strings returned by [`RejectReason::as_str`] are stable
//! identifiers that external tooling matches on literally.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use shared_types::{Amount, Wtxid};

use super::errors::AdmissionError;

/// Failure classification, ordered by increasing severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResultKind {
    PolicyViolation,
    TransactionRejected,
    ConsensusViolation,
}

/// How the relay layer treats the peer that sent a rejected submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PeerPenalty {
    /// Drop the submission, keep the peer.
    RejectOnly,
    /// Drop the submission, never re-request it, disconnect the peer.
    Disconnect,
}

impl ResultKind {
    /// Whether resubmitting with different fees, inputs or package shape can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ConsensusViolation)
    }

    pub fn peer_penalty(&self) -> PeerPenalty {
        match self {
            Self::ConsensusViolation => PeerPenalty::Disconnect,
            Self::PolicyViolation | Self::TransactionRejected => PeerPenalty::RejectOnly,
        }
    }
}

macro_rules! reject_reasons {
    ($($(#[$meta:meta])* $variant:ident => ($text:literal, $kind:ident),)*) => {
        /// Stable rejection identifiers.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum RejectReason {
            $($(#[$meta])* $variant,)*
        }

        impl RejectReason {
            /// Every reason, in declaration order.
            pub const ALL: &'static [RejectReason] = &[$(RejectReason::$variant,)*];

            /// The wire identifier.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                }
            }

            /// Default kind reported with this reason.
            pub fn kind(&self) -> ResultKind {
                match self {
                    $(Self::$variant => ResultKind::$kind,)*
                }
            }
        }
    };
}

reject_reasons! {
    // Package shape
    PackageTooManyTransactions => ("package-too-many-transactions", PolicyViolation),
    PackageTooLarge => ("package-too-large", PolicyViolation),
    PackageContainsDuplicates => ("package-contains-duplicates", PolicyViolation),
    PackageNotSorted => ("package-not-sorted", PolicyViolation),
    ConflictInPackage => ("conflict-in-package", PolicyViolation),
    /// Package-level summary when one or more members failed.
    TransactionFailed => ("transaction failed", TransactionRejected),

    // Structural consensus rules
    VinEmpty => ("bad-txns-vin-empty", ConsensusViolation),
    VoutEmpty => ("bad-txns-vout-empty", ConsensusViolation),
    Oversize => ("bad-txns-oversize", ConsensusViolation),
    VoutNegative => ("bad-txns-vout-negative", ConsensusViolation),
    VoutTooLarge => ("bad-txns-vout-toolarge", ConsensusViolation),
    TxOutTotalTooLarge => ("bad-txns-txouttotal-toolarge", ConsensusViolation),
    InputsDuplicate => ("bad-txns-inputs-duplicate", ConsensusViolation),
    PrevoutNull => ("bad-txns-prevout-null", ConsensusViolation),

    // Standardness
    Coinbase => ("coinbase", TransactionRejected),
    Version => ("version", TransactionRejected),
    TxSize => ("tx-size", TransactionRejected),
    ScriptSigSize => ("scriptsig-size", TransactionRejected),
    ScriptSigNotPushOnly => ("scriptsig-not-pushonly", TransactionRejected),
    ScriptPubKey => ("scriptpubkey", TransactionRejected),
    Dust => ("dust", TransactionRejected),
    MultiOpReturn => ("multi-op-return", TransactionRejected),

    // Duplicates and conflicts
    AlreadyInMempool => ("txn-already-in-mempool", TransactionRejected),
    SameNonWitnessDataInMempool => ("txn-same-nonwitness-data-in-mempool", TransactionRejected),
    AlreadyKnown => ("txn-already-known", TransactionRejected),
    MempoolConflict => ("txn-mempool-conflict", TransactionRejected),
    SpendsConflictingTx => ("bad-txns-spends-conflicting-tx", TransactionRejected),

    // Inputs and value balance
    /// Inputs unknown; the parent may not have been seen yet.
    MissingInputs => ("missing-inputs", TransactionRejected),
    PrematureCoinbaseSpend => ("bad-txns-premature-spend-of-coinbase", ConsensusViolation),
    InputValuesOutOfRange => ("bad-txns-inputvalues-outofrange", ConsensusViolation),
    InBelowOut => ("bad-txns-in-belowout", ConsensusViolation),

    // Scripts
    ScriptVerifyFailed => ("mandatory-script-verify-flag-failed", ConsensusViolation),

    // Fees and resource limits
    TooLongMempoolChain => ("too-long-mempool-chain", TransactionRejected),
    MinRelayFeeNotMet => ("min relay fee not met", TransactionRejected),
    MempoolMinFeeNotMet => ("mempool min fee not met", TransactionRejected),
    /// Admitted, then evicted by the size limit in the same pass.
    MempoolFull => ("mempool full", TransactionRejected),
    InsufficientFee => ("insufficient fee", TransactionRejected),
    TooManyReplacements => ("too many potential replacements", TransactionRejected),
    ReplacementAddsUnconfirmed => ("replacement-adds-unconfirmed", TransactionRejected),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single transaction's rejection, before it is reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl TxRejection {
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.reason.kind()
    }

    pub fn into_verdict(self) -> TxVerdict {
        TxVerdict::Invalid {
            kind: self.reason.kind(),
            reason: self.reason,
            detail: self.detail,
        }
    }
}

impl From<RejectReason> for TxRejection {
    fn from(reason: RejectReason) -> Self {
        Self::new(reason, String::new())
    }
}

/// Per-transaction outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TxVerdict {
    Valid {
        vsize: usize,
        fee: Amount,
    },
    Invalid {
        reason: RejectReason,
        kind: ResultKind,
        #[serde(skip_serializing_if = "String::is_empty")]
        detail: String,
    },
}

impl TxVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub fn reject_reason(&self) -> Option<&'static str> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn result_kind(&self) -> Option<ResultKind> {
        match self {
            Self::Valid { .. } => None,
            Self::Invalid { kind, .. } => Some(*kind),
        }
    }
}

/// Package-level outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PackageVerdict {
    AllValid,
    Invalid {
        reason: RejectReason,
        kind: ResultKind,
    },
}

impl PackageVerdict {
    pub fn invalid(reason: RejectReason) -> Self {
        Self::Invalid {
            reason,
            kind: reason.kind(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::AllValid)
    }

    pub fn reject_reason(&self) -> Option<&'static str> {
        match self {
            Self::AllValid => None,
            Self::Invalid { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn result_kind(&self) -> Option<ResultKind> {
        match self {
            Self::AllValid => None,
            Self::Invalid { kind, .. } => Some(*kind),
        }
    }
}

/// Package verdict plus every member's verdict, keyed by witness hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageResult {
    pub verdict: PackageVerdict,
    pub tx_results: BTreeMap<Wtxid, TxVerdict>,
}

impl PackageResult {
    /// A package rejected before any member was validated.
    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            verdict: PackageVerdict::invalid(reason),
            tx_results: BTreeMap::new(),
        }
    }

    pub fn get(&self, wtxid: &Wtxid) -> Option<&TxVerdict> {
        self.tx_results.get(wtxid)
    }

    pub fn is_valid(&self) -> bool {
        self.verdict.is_valid()
    }
}

/// Per-call admission state machine.
///
/// ```text
/// Sanitizing ──→ Validating ──→ Committing ──→ Done
///     │              │              │           ↑
///     │              ├──────────────┴→ RollingBack
///     └──────────────┴──────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdmissionStage {
    Sanitizing,
    Validating,
    Committing,
    RollingBack,
    Done,
}

impl AdmissionStage {
    /// Moves to `next`, refusing transitions the diagram above does not allow.
    pub fn advance(self, next: AdmissionStage) -> Result<AdmissionStage, AdmissionError> {
        use AdmissionStage::*;
        let allowed = matches!(
            (self, next),
            (Sanitizing, Validating)
                | (Sanitizing, Done)
                | (Validating, Committing)
                | (Validating, RollingBack)
                | (Validating, Done)
                | (Committing, RollingBack)
                | (Committing, Done)
                | (RollingBack, Done)
        );
        if allowed {
            Ok(next)
        } else {
            Err(AdmissionError::InvalidStageTransition {
                from: self,
                to: next,
            })
        }
    }
}
