//! # Ancestor / Descendant Linkage
//!
//! Dependency graph of pooled transactions: an edge `parent -> child` exists
//! when the child spends an output of the parent and both are in the pool.
//!
//! ## Usage
//!
//! - Chain limits: the admission path counts ancestors and, for each of
//!   them, their descendants before a new entry is accepted.
//! - Eviction: trimming ranks entries by the fee rate of the entry plus its
//!   descendants, and evicts that whole set.
//! - Replacement: a replaced entry takes all its descendants with it.

use shared_types::{Amount, Txid};
use std::collections::{HashMap, HashSet};

/// Ancestor totals for one transaction, excluding the transaction itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AncestorInfo {
    /// Number of ancestors
    pub ancestor_count: usize,
    /// Total virtual size of all ancestors
    pub total_ancestor_vsize: usize,
    /// Total fees of all ancestors
    pub total_ancestor_fees: Amount,
    /// Set of ancestor txids
    pub ancestor_txids: HashSet<Txid>,
}

/// Descendant totals for one transaction, excluding the transaction itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DescendantInfo {
    /// Number of descendants
    pub descendant_count: usize,
    /// Total virtual size of all descendants
    pub total_descendant_vsize: usize,
    /// Total fees of all descendants
    pub total_descendant_fees: Amount,
    /// Set of descendant txids
    pub descendant_txids: HashSet<Txid>,
}

impl AncestorInfo {
    /// Sums `(fee, vsize)` over `txids`; unknown txids are skipped.
    pub fn from_txids(
        txids: HashSet<Txid>,
        get_fee: impl Fn(&Txid) -> Option<(Amount, usize)>,
    ) -> Self {
        let mut info = Self::default();
        for txid in &txids {
            if let Some((fee, vsize)) = get_fee(txid) {
                info.ancestor_count += 1;
                info.total_ancestor_fees += fee;
                info.total_ancestor_vsize += vsize;
            }
        }
        info.ancestor_txids = txids;
        info
    }
}

impl DescendantInfo {
    /// Sums `(fee, vsize)` over `txids`; unknown txids are skipped.
    pub fn from_txids(
        txids: HashSet<Txid>,
        get_fee: impl Fn(&Txid) -> Option<(Amount, usize)>,
    ) -> Self {
        let mut info = Self::default();
        for txid in &txids {
            if let Some((fee, vsize)) = get_fee(txid) {
                info.descendant_count += 1;
                info.total_descendant_fees += fee;
                info.total_descendant_vsize += vsize;
            }
        }
        info.descendant_txids = txids;
        info
    }
}

/// Parent/child tracker for pooled transactions.
#[derive(Debug, Default)]
pub struct TransactionFamily {
    /// Parent -> Children mapping
    children: HashMap<Txid, HashSet<Txid>>,
    /// Child -> Parents mapping
    parents: HashMap<Txid, HashSet<Txid>>,
}

impl TransactionFamily {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transaction with its in-pool parents.
    pub fn register(&mut self, txid: Txid, parents: impl IntoIterator<Item = Txid>) {
        let parents: HashSet<Txid> = parents.into_iter().collect();
        for parent in &parents {
            self.children.entry(*parent).or_default().insert(txid);
        }
        self.parents.insert(txid, parents);
    }

    /// Unregister a transaction, dropping its links in both directions.
    ///
    /// Children stay registered; they simply lose this parent.
    pub fn unregister(&mut self, txid: &Txid) {
        if let Some(parents) = self.parents.remove(txid) {
            for parent in parents {
                if let Some(children) = self.children.get_mut(&parent) {
                    children.remove(txid);
                    if children.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
        }

        if let Some(children) = self.children.remove(txid) {
            for child in children {
                if let Some(parents) = self.parents.get_mut(&child) {
                    parents.remove(txid);
                }
            }
        }
    }

    /// Direct in-pool parents.
    pub fn parents_of(&self, txid: &Txid) -> impl Iterator<Item = &Txid> {
        self.parents.get(txid).into_iter().flatten()
    }

    /// Direct in-pool children.
    pub fn children_of(&self, txid: &Txid) -> impl Iterator<Item = &Txid> {
        self.children.get(txid).into_iter().flatten()
    }

    /// All transitive parents of `txid`.
    pub fn ancestors(&self, txid: &Txid) -> HashSet<Txid> {
        Self::walk(txid, &self.parents)
    }

    /// All transitive children of `txid`.
    pub fn descendants(&self, txid: &Txid) -> HashSet<Txid> {
        Self::walk(txid, &self.children)
    }

    fn walk(start: &Txid, edges: &HashMap<Txid, HashSet<Txid>>) -> HashSet<Txid> {
        let mut seen = HashSet::new();
        let mut stack: Vec<Txid> = edges.get(start).into_iter().flatten().copied().collect();

        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            if let Some(next) = edges.get(&current) {
                stack.extend(next.iter().copied());
            }
        }

        seen
    }
}
