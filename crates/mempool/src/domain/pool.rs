//! # Transaction Pool
//!
//! The shared store of admitted transactions.
//!
//! ## Data Structures
//!
//! - `by_txid`: O(1) lookup by identity hash
//! - `by_wtxid`: O(1) lookup by witness hash
//! - `spent`: which pool entry spends each outpoint (conflict detection)
//! - `family`: parent/child linkage between entries
//! - `by_score`: entries ordered by descendant fee rate, lowest first;
//!   trimming pops from the front instead of scanning the pool
//!
//! ## Invariants Enforced
//!
//! - No two entries share a txid or a wtxid (checked in `insert()`)
//! - No outpoint is spent by two entries (checked in `insert()`)
//! - Every declared parent is present when a child is inserted
//! - `total_vsize` / `total_fees` equal the sums over all entries
//! - Every entry has exactly one `by_score` position, refreshed for the
//!   entry and its ancestors whenever its descendant set changes
//!
//! The pool does not validate transactions; callers hold the lock from
//! `SharedPool::lock()` across any sequence that must appear atomic.

use super::entities::{EvictionScore, PoolEntry};
use super::errors::PoolError;
use super::family::{AncestorInfo, DescendantInfo, TransactionFamily};
use super::value_objects::{FeeRate, PoolStatus};
use shared_types::{Amount, OutPoint, Transaction, TxOut, Txid, Wtxid};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Transaction store with identity, witness and spend indices.
#[derive(Debug)]
pub struct TransactionPool {
    /// All entries indexed by txid.
    by_txid: HashMap<Txid, PoolEntry>,

    /// Witness hash -> txid.
    by_wtxid: HashMap<Wtxid, Txid>,

    /// Outpoint -> txid of the entry spending it.
    spent: HashMap<OutPoint, Txid>,

    /// Parent/child linkage.
    family: TransactionFamily,

    /// Eviction order.
    by_score: BTreeSet<EvictionScore>,
    /// Current `by_score` key of each entry.
    scores: HashMap<Txid, EvictionScore>,

    total_vsize: usize,
    total_fees: Amount,

    /// Floor raised by trimming; halves on every block.
    rolling_min_fee: FeeRate,
    incremental_fee: FeeRate,

    next_sequence: u64,
}

impl TransactionPool {
    /// Creates an empty pool. `incremental_fee` is added to the rate of every
    /// evicted package when raising the rolling minimum.
    pub fn new(incremental_fee: FeeRate) -> Self {
        Self {
            by_txid: HashMap::new(),
            by_wtxid: HashMap::new(),
            spent: HashMap::new(),
            family: TransactionFamily::new(),
            by_score: BTreeSet::new(),
            scores: HashMap::new(),
            total_vsize: 0,
            total_fees: 0,
            rolling_min_fee: FeeRate::ZERO,
            incremental_fee,
            next_sequence: 0,
        }
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.by_txid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_txid.is_empty()
    }

    pub fn lookup_by_identity(&self, txid: &Txid) -> Option<&PoolEntry> {
        self.by_txid.get(txid)
    }

    pub fn lookup_by_witness(&self, wtxid: &Wtxid) -> Option<&PoolEntry> {
        self.by_wtxid.get(wtxid).and_then(|txid| self.by_txid.get(txid))
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.by_txid.contains_key(txid)
    }

    /// The entry spending `outpoint`, if any.
    pub fn spender_of(&self, outpoint: &OutPoint) -> Option<Txid> {
        self.spent.get(outpoint).copied()
    }

    /// An output created by a pool entry.
    pub fn output(&self, outpoint: &OutPoint) -> Option<&TxOut> {
        self.by_txid
            .get(&outpoint.txid)
            .and_then(|entry| entry.output(outpoint.vout))
    }

    pub fn total_vsize(&self) -> usize {
        self.total_vsize
    }

    pub fn total_fees(&self) -> Amount {
        self.total_fees
    }

    /// Admission floor from past evictions. Zero until the pool has been
    /// trimmed; never below the incremental rate once raised.
    pub fn min_fee_rate(&self) -> FeeRate {
        if self.rolling_min_fee.is_zero() {
            return FeeRate::ZERO;
        }
        self.rolling_min_fee.max(self.incremental_fee)
    }

    /// Counters that a rolled-back commit must put back.
    pub(crate) fn checkpoint(&self) -> PoolCheckpoint {
        PoolCheckpoint {
            rolling_min_fee: self.rolling_min_fee,
            next_sequence: self.next_sequence,
        }
    }

    pub(crate) fn rewind(&mut self, checkpoint: PoolCheckpoint) {
        self.rolling_min_fee = checkpoint.rolling_min_fee;
        self.next_sequence = checkpoint.next_sequence;
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            size: self.size(),
            total_vsize: self.total_vsize,
            total_fees: self.total_fees,
            min_fee_rate: self.min_fee_rate(),
        }
    }

    /// Ancestors of a pool entry (excluding itself) with their totals.
    pub fn ancestors_of(&self, txid: &Txid) -> AncestorInfo {
        AncestorInfo::from_txids(self.family.ancestors(txid), |t| self.fee_and_vsize(t))
    }

    /// Descendants of a pool entry (excluding itself) with their totals.
    pub fn descendants_of(&self, txid: &Txid) -> DescendantInfo {
        DescendantInfo::from_txids(self.family.descendants(txid), |t| self.fee_and_vsize(t))
    }

    fn fee_and_vsize(&self, txid: &Txid) -> Option<(Amount, usize)> {
        self.by_txid.get(txid).map(|e| (e.fee(), e.vsize()))
    }

    /// Inputs of `tx` that spend pool entries.
    pub fn in_pool_parents(&self, tx: &Transaction) -> BTreeSet<Txid> {
        tx.inputs()
            .iter()
            .map(|input| input.previous_output.txid)
            .filter(|txid| self.by_txid.contains_key(txid))
            .collect()
    }

    /// Inserts an already-validated transaction.
    ///
    /// `parents` are the pool entries `tx` spends from.
    ///
    /// # Errors
    /// - `AlreadyExists` if the txid or wtxid is present
    /// - `MissingParent` if a parent is absent
    /// - `OutpointAlreadySpent` if an input is spent by another entry
    pub fn insert(
        &mut self,
        tx: Arc<Transaction>,
        fee: Amount,
        parents: BTreeSet<Txid>,
    ) -> Result<(), PoolError> {
        let sequence = self.next_sequence;
        self.insert_entry(PoolEntry::new(tx, fee, sequence), parents)?;
        self.next_sequence += 1;
        Ok(())
    }

    /// Re-inserts a previously removed entry, keeping its admission order.
    pub(crate) fn restore(&mut self, entry: PoolEntry) -> Result<(), PoolError> {
        let parents = self.in_pool_parents(entry.transaction());
        self.insert_entry(entry, parents)
    }

    fn insert_entry(
        &mut self,
        entry: PoolEntry,
        parents: BTreeSet<Txid>,
    ) -> Result<(), PoolError> {
        let txid = entry.txid();
        if self.by_txid.contains_key(&txid) || self.by_wtxid.contains_key(&entry.wtxid()) {
            return Err(PoolError::AlreadyExists(txid));
        }
        if let Some(parent) = parents.iter().find(|p| !self.by_txid.contains_key(*p)) {
            return Err(PoolError::MissingParent {
                txid,
                parent: *parent,
            });
        }
        if let Some(outpoint) = entry.spends().find(|o| self.spent.contains_key(*o)) {
            return Err(PoolError::OutpointAlreadySpent(*outpoint));
        }

        for outpoint in entry.spends() {
            self.spent.insert(*outpoint, txid);
        }
        self.family.register(txid, parents);
        self.by_wtxid.insert(entry.wtxid(), txid);
        self.total_vsize += entry.vsize();
        self.total_fees += entry.fee();
        self.by_txid.insert(txid, entry);

        let mut touched = self.family.ancestors(&txid);
        touched.insert(txid);
        self.refresh_scores(touched);

        Ok(())
    }

    /// Removes exactly one entry. In-pool children lose their link to it;
    /// use [`Self::remove_recursive`] to take them out as well.
    pub fn remove(&mut self, txid: &Txid) -> Result<PoolEntry, PoolError> {
        let entry = self
            .by_txid
            .remove(txid)
            .ok_or(PoolError::NotFound(*txid))?;
        let ancestors = self.family.ancestors(txid);

        for outpoint in entry.spends() {
            self.spent.remove(outpoint);
        }
        self.family.unregister(txid);
        self.by_wtxid.remove(&entry.wtxid());
        self.total_vsize -= entry.vsize();
        self.total_fees -= entry.fee();

        self.forget_score(txid);
        self.refresh_scores(ancestors);

        Ok(entry)
    }

    /// Recomputes the eviction position of each entry in `txids`. Absent
    /// entries are skipped.
    fn refresh_scores(&mut self, txids: impl IntoIterator<Item = Txid>) {
        for txid in txids {
            self.forget_score(&txid);
            if let Some(score) = self.eviction_score(&txid) {
                self.by_score.insert(score);
                self.scores.insert(txid, score);
            }
        }
    }

    fn forget_score(&mut self, txid: &Txid) {
        if let Some(score) = self.scores.remove(txid) {
            self.by_score.remove(&score);
        }
    }

    fn eviction_score(&self, txid: &Txid) -> Option<EvictionScore> {
        let entry = self.by_txid.get(txid)?;
        let descendants = self.descendants_of(txid);
        Some(EvictionScore {
            descendant_rate: FeeRate::from_fee(
                entry.fee() + descendants.total_descendant_fees,
                entry.vsize() + descendants.total_descendant_vsize,
            ),
            recency: Reverse(entry.sequence()),
            txid: *txid,
        })
    }

    /// Removes an entry and all its descendants.
    ///
    /// Returned entries are in admission order, so re-inserting them in
    /// sequence restores every parent before its children.
    pub fn remove_recursive(&mut self, txid: &Txid) -> Result<Vec<PoolEntry>, PoolError> {
        if !self.by_txid.contains_key(txid) {
            return Err(PoolError::NotFound(*txid));
        }
        let mut doomed: Vec<Txid> = self.family.descendants(txid).into_iter().collect();
        doomed.push(*txid);

        let mut removed = doomed
            .iter()
            .map(|t| self.remove(t))
            .collect::<Result<Vec<_>, _>>()?;
        removed.sort_by_key(PoolEntry::sequence);
        Ok(removed)
    }

    /// Removes transactions confirmed in a block, and every pool entry that
    /// conflicts with them.
    ///
    /// Confirmed entries are removed alone (their children now spend
    /// confirmed outputs); conflicting entries go with their descendants.
    /// Returns the txids of the evicted conflicts.
    pub fn remove_for_block(&mut self, block: &[Arc<Transaction>]) -> Vec<Txid> {
        let mut conflicts = Vec::new();

        for tx in block {
            let txid = tx.txid();
            match self.remove(&txid) {
                Ok(_) => continue,
                Err(err) => trace!(%txid, %err, "block transaction was not pooled"),
            }
            for input in tx.inputs() {
                let Some(spender) = self.spender_of(&input.previous_output) else {
                    continue;
                };
                if let Ok(removed) = self.remove_recursive(&spender) {
                    conflicts.extend(removed.iter().map(PoolEntry::txid));
                }
            }
        }

        self.decay_min_fee();
        conflicts
    }

    /// Halves the rolling minimum, dropping it once it falls below half the
    /// incremental rate.
    fn decay_min_fee(&mut self) {
        let halved = FeeRate::per_kvb(self.rolling_min_fee.as_per_kvb() / 2);
        self.rolling_min_fee = if halved.as_per_kvb() * 2 < self.incremental_fee.as_per_kvb() {
            FeeRate::ZERO
        } else {
            halved
        };
    }

    /// Evicts the entries with the lowest descendant fee rate (entry plus
    /// descendants) until the pool fits in `max_vsize`.
    ///
    /// Each eviction raises the rolling minimum fee to the evicted package's
    /// rate plus the incremental rate. Returns the evicted entries in
    /// eviction order.
    pub fn trim_to_size(&mut self, max_vsize: usize) -> Vec<PoolEntry> {
        let mut evicted = Vec::new();

        while self.total_vsize > max_vsize {
            let Some(lowest) = self.by_score.first().copied() else {
                break;
            };

            let floor = lowest.descendant_rate.saturating_add(self.incremental_fee);
            if floor > self.rolling_min_fee {
                self.rolling_min_fee = floor;
            }

            match self.remove_recursive(&lowest.txid) {
                Ok(removed) => evicted.extend(removed),
                Err(err) => {
                    warn!(txid = %lowest.txid, %err, "eviction order out of sync with pool");
                    break;
                }
            }
        }

        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                min_fee_rate = %self.min_fee_rate(),
                "trimmed pool"
            );
        }
        evicted
    }
}

/// Pool counters saved before a staged commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PoolCheckpoint {
    rolling_min_fee: FeeRate,
    next_sequence: u64,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new(FeeRate::per_kvb(1_000))
    }
}
