//! # Inbound Port - PackageAdmissionApi
//!
//! Primary driving port through which relay, RPC and wallet code submit
//! transactions.
//!
//! | Method | Effect on the pool |
//! |--------|--------------------|
//! | `process_package(.., test_accept = false)` | All-or-nothing insert |
//! | `process_package(.., test_accept = true)` | None; reports what a commit would do |
//! | `accept_transaction` | Same as a one-member package |

use crate::domain::{AdmissionError, PackageResult, PoolStatus};
use shared_types::{Package, Transaction, Txid};
use std::sync::Arc;

/// Primary API for package admission.
///
/// # Example
///
/// ```rust,ignore
/// use mempool::ports::PackageAdmissionApi;
///
/// fn submit(mempool: &impl PackageAdmissionApi, parent: Arc<Transaction>, child: Arc<Transaction>) {
///     let dry = mempool.process_package(vec![parent.clone(), child.clone()], true)?;
///     if dry.is_valid() {
///         mempool.process_package(vec![parent, child], false)?;
///     }
/// }
/// ```
pub trait PackageAdmissionApi: Send + Sync {
    /// Validates a topologically sorted package and, unless `test_accept`,
    /// admits every member or none of them.
    ///
    /// Rejections are reported in the returned [`PackageResult`], never as
    /// an `Err`.
    ///
    /// # Errors
    /// - `EmptyPackage`: `transactions` is empty
    /// - `Commit`: the pool refused an insert that validation had accepted;
    ///   the pool is left as it was before the call
    fn process_package(
        &self,
        transactions: Package,
        test_accept: bool,
    ) -> Result<PackageResult, AdmissionError>;

    /// Single-transaction submission. Replacement of conflicting pool
    /// entries is only considered for one-member packages.
    fn accept_transaction(
        &self,
        tx: Arc<Transaction>,
        test_accept: bool,
    ) -> Result<PackageResult, AdmissionError> {
        self.process_package(vec![tx], test_accept)
    }

    /// Number of pooled transactions.
    fn pool_size(&self) -> usize;

    /// Whether a transaction with this txid is pooled.
    fn contains(&self, txid: &Txid) -> bool;

    /// Pool totals and current admission floor.
    fn status(&self) -> PoolStatus;
}
