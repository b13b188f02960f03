//! # Package Sanitizer
//!
//! Structural checks on a package before any chain state is read or the
//! pool lock is taken. Cost depends only on package shape.
//!
//! ## Rules (in order)
//!
//! | Rule | Reason |
//! |------|--------|
//! | count > `max_count` | `package-too-many-transactions` |
//! | count > 1 and Σ vsize > `max_vsize` | `package-too-large` |
//! | repeated txid | `package-contains-duplicates` |
//! | member spends a later member | `package-not-sorted` |
//! | two members spend one outpoint | `conflict-in-package` |
//!
//! A lone transaction skips the aggregate size rule; its own size limit is
//! reported by the per-transaction validator as `tx-size`.
//!
//! Out-of-order packages are rejected, never re-sorted.

use super::entities::MempoolConfig;
use super::verdict::RejectReason;
use shared_types::{Transaction, Txid};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Package shape limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackageLimits {
    pub max_count: usize,
    pub max_vsize: usize,
}

impl From<&MempoolConfig> for PackageLimits {
    fn from(config: &MempoolConfig) -> Self {
        Self {
            max_count: config.max_package_count,
            max_vsize: config.max_package_vsize,
        }
    }
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self::from(&MempoolConfig::default())
    }
}

/// Why a package was refused before validation. Always a policy violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageRejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl PackageRejection {
    fn new(reason: RejectReason, detail: String) -> Self {
        Self { reason, detail }
    }
}

/// Checks package shape. The package must not be empty.
pub fn sanitize(
    package: &[Arc<Transaction>],
    limits: &PackageLimits,
) -> Result<(), PackageRejection> {
    let count = package.len();
    if count > limits.max_count {
        return Err(PackageRejection::new(
            RejectReason::PackageTooManyTransactions,
            format!("{count} transactions, limit {}", limits.max_count),
        ));
    }

    if count > 1 {
        let total_vsize: usize = package.iter().map(|tx| tx.vsize()).sum();
        if total_vsize > limits.max_vsize {
            return Err(PackageRejection::new(
                RejectReason::PackageTooLarge,
                format!("{total_vsize} vbytes, limit {}", limits.max_vsize),
            ));
        }
    }

    let mut position: HashMap<Txid, usize> = HashMap::with_capacity(count);
    for (index, tx) in package.iter().enumerate() {
        if position.insert(tx.txid(), index).is_some() {
            return Err(PackageRejection::new(
                RejectReason::PackageContainsDuplicates,
                format!("txid {} repeated", tx.txid()),
            ));
        }
    }

    for (index, tx) in package.iter().enumerate() {
        let spends_later = tx.inputs().iter().find_map(|input| {
            position
                .get(&input.previous_output.txid)
                .filter(|parent_index| **parent_index > index)
        });
        if let Some(parent_index) = spends_later {
            return Err(PackageRejection::new(
                RejectReason::PackageNotSorted,
                format!("member {index} spends member {parent_index}"),
            ));
        }
    }

    // Repeated inputs inside one transaction are a consensus failure for the
    // validator to report, not a package conflict.
    let mut spent = HashSet::new();
    for tx in package {
        if let Some(input) = tx
            .inputs()
            .iter()
            .find(|input| spent.contains(&input.previous_output))
        {
            return Err(PackageRejection::new(
                RejectReason::ConflictInPackage,
                format!("outpoint {} spent twice", input.previous_output),
            ));
        }
        spent.extend(tx.inputs().iter().map(|input| input.previous_output));
    }

    Ok(())
}
