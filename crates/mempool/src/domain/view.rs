//! # Package View
//!
//! The pool as seen by one admission pass: the locked pool overlaid with the
//! package members accepted earlier in the same pass. Validation reads only
//! through this view, so dry runs and commits see identical state and the
//! pool itself is never touched until the commit step.

use super::family::{AncestorInfo, DescendantInfo};
use super::pool::TransactionPool;
use super::validator::AcceptedEntry;
use shared_types::{Amount, OutPoint, TxOut, Txid};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Who spends an outpoint inside the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Spender {
    /// A pool entry.
    Pool(Txid),
    /// A package member accepted earlier in this pass.
    Staged(Txid),
}

/// Pool snapshot plus staged package members.
#[derive(Debug)]
pub struct PackageView<'p> {
    pool: &'p TransactionPool,
    staged: Vec<AcceptedEntry>,
    staged_index: HashMap<Txid, usize>,
    staged_spent: HashMap<OutPoint, Txid>,
}

impl<'p> PackageView<'p> {
    pub fn new(pool: &'p TransactionPool) -> Self {
        Self {
            pool,
            staged: Vec::new(),
            staged_index: HashMap::new(),
            staged_spent: HashMap::new(),
        }
    }

    pub fn pool(&self) -> &'p TransactionPool {
        self.pool
    }

    /// Makes `entry` visible to later members of the package.
    pub fn stage(&mut self, entry: AcceptedEntry) {
        let txid = entry.tx.txid();
        for input in entry.tx.inputs() {
            self.staged_spent.insert(input.previous_output, txid);
        }
        self.staged_index.insert(txid, self.staged.len());
        self.staged.push(entry);
    }

    /// Releases the pool borrow, handing back the staged entries in order.
    pub fn into_staged(self) -> Vec<AcceptedEntry> {
        self.staged
    }

    fn staged_entry(&self, txid: &Txid) -> Option<&AcceptedEntry> {
        self.staged_index.get(txid).map(|i| &self.staged[*i])
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.staged_index.contains_key(txid) || self.pool.contains(txid)
    }

    pub fn spender_of(&self, outpoint: &OutPoint) -> Option<Spender> {
        if let Some(txid) = self.staged_spent.get(outpoint) {
            return Some(Spender::Staged(*txid));
        }
        self.pool.spender_of(outpoint).map(Spender::Pool)
    }

    /// An unconfirmed output, created by a staged member or a pool entry.
    pub fn output(&self, outpoint: &OutPoint) -> Option<&TxOut> {
        match self.staged_entry(&outpoint.txid) {
            Some(entry) => entry.tx.outputs().get(outpoint.vout as usize),
            None => self.pool.output(outpoint),
        }
    }

    pub fn fee_and_vsize(&self, txid: &Txid) -> Option<(Amount, usize)> {
        match self.staged_entry(txid) {
            Some(entry) => Some((entry.fee, entry.vsize)),
            None => self
                .pool
                .lookup_by_identity(txid)
                .map(|e| (e.fee(), e.vsize())),
        }
    }

    /// Every ancestor reachable through `parents`, staged or pooled.
    pub fn ancestry(&self, parents: &BTreeSet<Txid>) -> AncestorInfo {
        let mut txids = HashSet::new();
        for parent in parents {
            match self.staged_entry(parent) {
                Some(entry) => txids.extend(entry.ancestors.iter().copied()),
                None => txids.extend(self.pool.ancestors_of(parent).ancestor_txids),
            }
            txids.insert(*parent);
        }
        AncestorInfo::from_txids(txids, |t| self.fee_and_vsize(t))
    }

    /// Descendants of `txid` across pool and staged members, excluding itself.
    pub fn descendants(&self, txid: &Txid) -> DescendantInfo {
        let mut txids = if self.staged_index.contains_key(txid) {
            HashSet::new()
        } else {
            self.pool.descendants_of(txid).descendant_txids
        };
        txids.extend(
            self.staged
                .iter()
                .filter(|entry| entry.ancestors.contains(txid))
                .map(|entry| entry.tx.txid()),
        );
        DescendantInfo::from_txids(txids, |t| self.fee_and_vsize(t))
    }
}
