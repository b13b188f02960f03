//! # Shared Pool Handle
//!
//! The pool is one process-wide resource. Every reader and writer goes
//! through [`SharedPool::lock`]; the returned guard is the only way to reach
//! the [`TransactionPool`], and it releases the lock on every exit path.

use crate::domain::{FeeRate, PoolStatus, TransactionPool};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Cloneable handle to the exclusively-locked pool.
#[derive(Clone, Debug)]
pub struct SharedPool {
    inner: Arc<Mutex<TransactionPool>>,
}

impl SharedPool {
    pub fn new(pool: TransactionPool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    /// Empty pool using `incremental_fee` for eviction floors.
    pub fn with_incremental_fee(incremental_fee: FeeRate) -> Self {
        Self::new(TransactionPool::new(incremental_fee))
    }

    /// Takes the exclusive lock. Hold the guard across any sequence of pool
    /// operations that must appear atomic to other callers.
    pub fn lock(&self) -> MutexGuard<'_, TransactionPool> {
        self.inner.lock()
    }

    pub fn size(&self) -> usize {
        self.lock().size()
    }

    pub fn status(&self) -> PoolStatus {
        self.lock().status()
    }
}

impl Default for SharedPool {
    fn default() -> Self {
        Self::new(TransactionPool::default())
    }
}
