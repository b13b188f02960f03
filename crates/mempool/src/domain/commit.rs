//! # Staged Commit
//!
//! Applies a validated package to the pool as one unit, then trims the pool
//! back to its size limit. Every change is recorded; if the commit is dropped
//! before [`StagedCommit::finish`] (an insertion failed, a member did not
//! survive the trim, the pass was a dry run, or the caller returned early)
//! the pool is put back exactly as it was, rolling minimum fee included.

use super::entities::PoolEntry;
use super::errors::PoolError;
use super::pool::{PoolCheckpoint, TransactionPool};
use super::validator::AcceptedEntry;
use shared_types::Txid;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Entries removed by a finished commit.
#[derive(Debug, Default)]
pub struct CommitOutcome {
    /// Evicted by replacement.
    pub replaced: Vec<PoolEntry>,
    /// Evicted by the size limit.
    pub trimmed: Vec<PoolEntry>,
}

/// Undo log over a locked pool.
pub struct StagedCommit<'p> {
    pool: &'p mut TransactionPool,
    checkpoint: PoolCheckpoint,
    inserted: Vec<Txid>,
    evicted: Vec<PoolEntry>,
    trimmed: Vec<PoolEntry>,
    finished: bool,
}

impl<'p> StagedCommit<'p> {
    pub fn new(pool: &'p mut TransactionPool) -> Self {
        Self {
            checkpoint: pool.checkpoint(),
            pool,
            inserted: Vec::new(),
            evicted: Vec::new(),
            trimmed: Vec::new(),
            finished: false,
        }
    }

    /// Evicts the entries `entry` replaces, then inserts it.
    pub fn apply(&mut self, entry: &AcceptedEntry) -> Result<(), PoolError> {
        for txid in &entry.replaced {
            // Descendants of an earlier conflict are already gone.
            if self.pool.contains(txid) {
                let removed = self.pool.remove_recursive(txid)?;
                self.evicted.extend(removed);
            }
        }
        let txid = entry.tx.txid();
        self.pool
            .insert(entry.tx.clone(), entry.fee, entry.parents.clone())?;
        self.inserted.push(txid);
        Ok(())
    }

    /// Entries evicted by replacement so far.
    pub fn evicted(&self) -> &[PoolEntry] {
        &self.evicted
    }

    /// Trims the pool to `max_vsize`. Returns the staged txids the trim
    /// evicted, in staging order; any of them means the commit cannot
    /// finish.
    pub fn trim(&mut self, max_vsize: usize) -> Vec<Txid> {
        let trimmed = self.pool.trim_to_size(max_vsize);
        self.trimmed.extend(trimmed);
        self.inserted
            .iter()
            .filter(|txid| !self.pool.contains(txid))
            .copied()
            .collect()
    }

    /// Keeps every change.
    pub fn finish(mut self) -> CommitOutcome {
        self.finished = true;
        CommitOutcome {
            replaced: std::mem::take(&mut self.evicted),
            trimmed: std::mem::take(&mut self.trimmed),
        }
    }

    fn undo(&mut self) {
        let inserted: HashSet<Txid> = self.inserted.iter().copied().collect();
        for txid in self.inserted.drain(..).rev() {
            if !self.pool.contains(&txid) {
                continue;
            }
            if let Err(err) = self.pool.remove(&txid) {
                warn!(%txid, %err, "rollback could not remove staged entry");
            }
        }

        let mut removed: Vec<PoolEntry> = self
            .evicted
            .drain(..)
            .chain(self.trimmed.drain(..))
            .filter(|entry| !inserted.contains(&entry.txid()))
            .collect();
        removed.sort_by_key(PoolEntry::sequence);
        for entry in removed {
            let txid = entry.txid();
            if let Err(err) = self.pool.restore(entry) {
                warn!(%txid, %err, "rollback could not restore evicted entry");
            }
        }
        self.pool.rewind(self.checkpoint);
    }
}

impl Drop for StagedCommit<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if !self.inserted.is_empty() || !self.evicted.is_empty() || !self.trimmed.is_empty() {
            debug!(
                inserted = self.inserted.len(),
                evicted = self.evicted.len(),
                trimmed = self.trimmed.len(),
                "rolling back commit"
            );
        }
        self.undo();
    }
}
