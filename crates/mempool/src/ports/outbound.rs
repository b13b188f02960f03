//! Outbound (Driven) ports for the Mempool subsystem.
//!
//! These traits define dependencies on external systems that the Mempool
//! needs for operation.

use shared_types::{Coin, OutPoint, Transaction, TxOut};
use std::sync::Arc;

/// Read access to the confirmed UTXO set.
pub trait ChainState: Send + Sync {
    /// Height of the current chain tip.
    fn tip_height(&self) -> u64;

    /// The unspent confirmed output at `outpoint`, if any.
    fn coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}

/// Script and signature verification.
///
/// Must be a pure function of its arguments: the same call always returns
/// the same answer on every node.
pub trait ScriptVerifier: Send + Sync {
    /// Whether input `input_index` of `tx` satisfies `spent.script_pubkey`.
    fn verify_script(&self, tx: &Transaction, input_index: usize, spent: &TxOut) -> bool;
}

impl<T: ChainState + ?Sized> ChainState for Arc<T> {
    fn tip_height(&self) -> u64 {
        (**self).tip_height()
    }

    fn coin(&self, outpoint: &OutPoint) -> Option<Coin> {
        (**self).coin(outpoint)
    }
}

impl<T: ScriptVerifier + ?Sized> ScriptVerifier for Arc<T> {
    fn verify_script(&self, tx: &Transaction, input_index: usize, spent: &TxOut) -> bool {
        (**self).verify_script(tx, input_index, spent)
    }
}
