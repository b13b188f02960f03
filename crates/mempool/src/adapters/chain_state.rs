//! In-memory UTXO set implementing [`ChainState`].
//!
//! Used by the CLI fixtures and tests; a node would back the port with its
//! coins database instead.

use crate::ports::outbound::ChainState;
use parking_lot::RwLock;
use shared_types::{Coin, OutPoint, Transaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Confirmed coins keyed by outpoint, plus the tip height.
#[derive(Debug, Default)]
pub struct InMemoryChainState {
    coins: RwLock<HashMap<OutPoint, Coin>>,
    tip_height: AtomicU64,
}

impl InMemoryChainState {
    pub fn new(tip_height: u64) -> Self {
        Self {
            coins: RwLock::new(HashMap::new()),
            tip_height: AtomicU64::new(tip_height),
        }
    }

    pub fn add_coin(&self, outpoint: OutPoint, coin: Coin) {
        self.coins.write().insert(outpoint, coin);
    }

    /// Removes and returns a coin.
    pub fn spend_coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.write().remove(outpoint)
    }

    pub fn set_tip_height(&self, height: u64) {
        self.tip_height.store(height, Ordering::SeqCst);
    }

    /// Applies a confirmed transaction: its inputs are spent and its outputs
    /// become coins at `height`.
    pub fn connect_transaction(&self, tx: &Transaction, height: u64) {
        let mut coins = self.coins.write();
        if !tx.is_coinbase() {
            for input in tx.inputs() {
                coins.remove(&input.previous_output);
            }
        }
        for (vout, output) in tx.outputs().iter().enumerate() {
            coins.insert(
                tx.outpoint(vout as u32),
                Coin {
                    output: output.clone(),
                    height,
                    is_coinbase: tx.is_coinbase(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.coins.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.read().is_empty()
    }
}

impl ChainState for InMemoryChainState {
    fn tip_height(&self) -> u64 {
        self.tip_height.load(Ordering::SeqCst)
    }

    fn coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        self.coins.read().get(outpoint).cloned()
    }
}
