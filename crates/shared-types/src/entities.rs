//! # Core Domain Entities
//!
//! Transactions, their inputs and outputs, and unspent coins.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::encoding::{compact_size_len, encode_transaction};
use crate::hashes::{sha256d, Txid, Wtxid};
use crate::script::Script;

/// Amount in base units. Signed so that malformed negative values can be
/// represented and rejected rather than wrapping.
pub type Amount = i64;

/// Base units per coin.
pub const COIN: Amount = 100_000_000;

/// One hundredth of a coin.
pub const CENT: Amount = 1_000_000;

/// Upper bound of any single amount or sum of amounts.
pub const MAX_MONEY: Amount = 21_000_000 * COIN;

/// Weight units per virtual byte.
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// Default input sequence (final).
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// An ordered group of transactions submitted for admission together.
pub type Package = Vec<Arc<Transaction>>;

/// Returns true if `value` is inside the consensus money range.
pub fn money_range(value: Amount) -> bool {
    (0..=MAX_MONEY).contains(&value)
}

/// Reference to a specific output of a prior transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Txid,
    pub vout: u32,
}

impl OutPoint {
    pub const fn new(txid: Txid, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// The outpoint referenced by coinbase inputs.
    pub const fn null() -> Self {
        Self {
            txid: Txid::ZERO,
            vout: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Transaction input.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TxIn {
    pub previous_output: OutPoint,
    #[serde(default)]
    pub script_sig: Script,
    #[serde(default = "default_sequence")]
    pub sequence: u32,
    #[serde_as(as = "Vec<Hex>")]
    #[serde(default)]
    pub witness: Vec<Vec<u8>>,
}

fn default_sequence() -> u32 {
    SEQUENCE_FINAL
}

impl TxIn {
    /// Unsigned input spending `previous_output`.
    pub fn new(previous_output: OutPoint) -> Self {
        Self {
            previous_output,
            script_sig: Script::default(),
            sequence: SEQUENCE_FINAL,
            witness: Vec::new(),
        }
    }
}

/// Transaction output.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    /// Encoded size of this output in bytes.
    pub fn serialized_size(&self) -> usize {
        8 + compact_size_len(self.script_pubkey.len() as u64) + self.script_pubkey.len()
    }
}

/// Plain transaction data, freely editable. Convert into a [`Transaction`]
/// to obtain identities and size metrics.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MutableTransaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    #[serde(default)]
    pub lock_time: u32,
}

impl Default for MutableTransaction {
    fn default() -> Self {
        Self {
            version: 2,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
        }
    }
}

impl MutableTransaction {
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }
}

/// Immutable transaction with cached identities and sizes.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "MutableTransaction", into = "MutableTransaction")]
pub struct Transaction {
    data: MutableTransaction,
    txid: Txid,
    wtxid: Wtxid,
    base_size: usize,
    total_size: usize,
}

impl Transaction {
    pub fn new(data: MutableTransaction) -> Self {
        let base = encode_transaction(&data, false);
        let (wtxid, total_size) = if data.has_witness() {
            let full = encode_transaction(&data, true);
            (Wtxid(sha256d(&full)), full.len())
        } else {
            (Wtxid(sha256d(&base)), base.len())
        };

        Self {
            txid: Txid(sha256d(&base)),
            wtxid,
            base_size: base.len(),
            total_size,
            data,
        }
    }

    pub fn txid(&self) -> Txid {
        self.txid
    }

    pub fn wtxid(&self) -> Wtxid {
        self.wtxid
    }

    pub fn version(&self) -> i32 {
        self.data.version
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.data.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.data.outputs
    }

    pub fn lock_time(&self) -> u32 {
        self.data.lock_time
    }

    pub fn has_witness(&self) -> bool {
        self.data.has_witness()
    }

    /// Encoded size without witness data.
    pub fn base_size(&self) -> usize {
        self.base_size
    }

    /// Encoded size including witness data.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// `base_size * 3 + total_size`
    pub fn weight(&self) -> usize {
        self.base_size * (WITNESS_SCALE_FACTOR - 1) + self.total_size
    }

    /// Weight divided by four, rounded up.
    pub fn vsize(&self) -> usize {
        self.weight().div_ceil(WITNESS_SCALE_FACTOR)
    }

    /// A coinbase has exactly one input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.data.inputs.len() == 1 && self.data.inputs[0].previous_output.is_null()
    }

    /// Outpoint of output `vout` of this transaction.
    pub fn outpoint(&self, vout: u32) -> OutPoint {
        OutPoint::new(self.txid, vout)
    }

    /// Sum of output values, or `None` if any value or the sum leaves the
    /// money range.
    pub fn total_output_value(&self) -> Option<Amount> {
        self.data.outputs.iter().try_fold(0 as Amount, |acc, out| {
            let sum = acc.checked_add(out.value)?;
            (money_range(out.value) && money_range(sum)).then_some(sum)
        })
    }

    /// Borrows the underlying transaction data.
    pub fn data(&self) -> &MutableTransaction {
        &self.data
    }

    /// Returns an editable copy.
    pub fn to_mutable(&self) -> MutableTransaction {
        self.data.clone()
    }
}

impl From<MutableTransaction> for Transaction {
    fn from(data: MutableTransaction) -> Self {
        Self::new(data)
    }
}

impl From<Transaction> for MutableTransaction {
    fn from(tx: Transaction) -> Self {
        tx.data
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.wtxid == other.wtxid
    }
}

impl Eq for Transaction {}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("txid", &self.txid)
            .field("wtxid", &self.wtxid)
            .field("inputs", &self.data.inputs.len())
            .field("outputs", &self.data.outputs.len())
            .field("vsize", &self.vsize())
            .finish()
    }
}

/// An unspent output recorded in the confirmed chain state.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Coin {
    pub output: TxOut,
    /// Height of the block that created the output.
    pub height: u64,
    pub is_coinbase: bool,
}
