//! Core domain entities for the Mempool subsystem.
//!
//! Pool entries and the admission configuration.

use super::errors::ConfigError;
use super::value_objects::FeeRate;
use shared_types::{Amount, OutPoint, Transaction, TxOut, Txid, Wtxid};
use std::cmp::Reverse;
use std::env;
use std::str::FromStr;
use std::sync::Arc;

/// Prefix of every configuration environment variable.
pub const ENV_PREFIX: &str = "LEDGER_MEMPOOL_";

/// A transaction admitted to the pool with its accounting data.
#[derive(Clone, Debug)]
pub struct PoolEntry {
    tx: Arc<Transaction>,
    fee: Amount,
    vsize: usize,
    /// Admission order; parents always carry a lower value than children.
    sequence: u64,
}

impl PoolEntry {
    pub(crate) fn new(tx: Arc<Transaction>, fee: Amount, sequence: u64) -> Self {
        let vsize = tx.vsize();
        Self {
            tx,
            fee,
            vsize,
            sequence,
        }
    }

    pub fn transaction(&self) -> &Arc<Transaction> {
        &self.tx
    }

    pub fn txid(&self) -> Txid {
        self.tx.txid()
    }

    pub fn wtxid(&self) -> Wtxid {
        self.tx.wtxid()
    }

    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn vsize(&self) -> usize {
        self.vsize
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn fee_rate(&self) -> FeeRate {
        FeeRate::from_fee(self.fee, self.vsize)
    }

    /// Output `vout` of this entry, if it exists.
    pub fn output(&self, vout: u32) -> Option<&TxOut> {
        self.tx.outputs().get(vout as usize)
    }

    pub fn spends(&self) -> impl Iterator<Item = &OutPoint> {
        self.tx.inputs().iter().map(|input| &input.previous_output)
    }
}

/// Position of a pool entry in eviction order.
///
/// Sorts by the fee rate of the entry together with its descendants, lowest
/// first; among equal rates the most recently admitted entry comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EvictionScore {
    pub descendant_rate: FeeRate,
    pub recency: Reverse<u64>,
    pub txid: Txid,
}

/// Mempool configuration.
///
/// Defaults match the relay policy of the public network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MempoolConfig {
    /// Maximum transactions in one package.
    pub max_package_count: usize,
    /// Maximum summed virtual size of a multi-transaction package.
    pub max_package_vsize: usize,
    /// Largest standard transaction weight.
    pub max_standard_tx_weight: usize,
    /// Fee rate below which transactions are not relayed.
    pub min_relay_fee_rate: FeeRate,
    /// Step used for replacement fees and the rolling minimum.
    pub incremental_relay_fee_rate: FeeRate,
    /// Rate used to compute the dust threshold of an output.
    pub dust_relay_fee_rate: FeeRate,
    /// Pool is trimmed to this many virtual bytes after each commit.
    pub max_pool_vsize: usize,
    /// Ancestor count limit, including the transaction itself.
    pub max_ancestors: usize,
    /// Descendant count limit, including the transaction itself.
    pub max_descendants: usize,
    pub max_ancestor_vsize: usize,
    pub max_descendant_vsize: usize,
    /// Blocks before a coinbase output may be spent.
    pub coinbase_maturity: u64,
    /// Enable Replace-by-Fee.
    pub enable_rbf: bool,
    /// Maximum pool entries one replacement may evict.
    pub max_replacements: usize,
    /// Largest standard null-data output script.
    pub max_op_return_bytes: usize,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_package_count: 25,
            max_package_vsize: 101_000,
            max_standard_tx_weight: 400_000,
            min_relay_fee_rate: FeeRate::per_kvb(1_000),
            incremental_relay_fee_rate: FeeRate::per_kvb(1_000),
            dust_relay_fee_rate: FeeRate::per_kvb(3_000),
            max_pool_vsize: 300_000_000,
            max_ancestors: 25,
            max_descendants: 25,
            max_ancestor_vsize: 101_000,
            max_descendant_vsize: 101_000,
            coinbase_maturity: 100,
            enable_rbf: true,
            max_replacements: 100,
            max_op_return_bytes: 83,
        }
    }
}

impl MempoolConfig {
    /// Creates a config for testing: short coinbase maturity, small pool.
    pub fn for_testing() -> Self {
        Self {
            coinbase_maturity: 10,
            max_pool_vsize: 1_000_000,
            ..Default::default()
        }
    }

    /// Defaults overridden by `LEDGER_MEMPOOL_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default value. Fee rates are
    /// read in base units per 1,000 vB.
    ///
    /// # Environment Variables
    ///
    /// - `LEDGER_MEMPOOL_MAX_PACKAGE_COUNT`
    /// - `LEDGER_MEMPOOL_MAX_PACKAGE_VSIZE`
    /// - `LEDGER_MEMPOOL_MAX_STANDARD_TX_WEIGHT`
    /// - `LEDGER_MEMPOOL_MIN_RELAY_FEE_RATE`
    /// - `LEDGER_MEMPOOL_INCREMENTAL_RELAY_FEE_RATE`
    /// - `LEDGER_MEMPOOL_DUST_RELAY_FEE_RATE`
    /// - `LEDGER_MEMPOOL_MAX_POOL_VSIZE`
    /// - `LEDGER_MEMPOOL_MAX_ANCESTORS` / `LEDGER_MEMPOOL_MAX_DESCENDANTS`
    /// - `LEDGER_MEMPOOL_MAX_ANCESTOR_VSIZE` / `LEDGER_MEMPOOL_MAX_DESCENDANT_VSIZE`
    /// - `LEDGER_MEMPOOL_COINBASE_MATURITY`
    /// - `LEDGER_MEMPOOL_ENABLE_RBF` (`1`/`true`)
    /// - `LEDGER_MEMPOOL_MAX_REPLACEMENTS`
    /// - `LEDGER_MEMPOOL_MAX_OP_RETURN_BYTES`
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            max_package_count: env_or("MAX_PACKAGE_COUNT", d.max_package_count),
            max_package_vsize: env_or("MAX_PACKAGE_VSIZE", d.max_package_vsize),
            max_standard_tx_weight: env_or("MAX_STANDARD_TX_WEIGHT", d.max_standard_tx_weight),
            min_relay_fee_rate: FeeRate(env_or("MIN_RELAY_FEE_RATE", d.min_relay_fee_rate.0)),
            incremental_relay_fee_rate: FeeRate(env_or(
                "INCREMENTAL_RELAY_FEE_RATE",
                d.incremental_relay_fee_rate.0,
            )),
            dust_relay_fee_rate: FeeRate(env_or("DUST_RELAY_FEE_RATE", d.dust_relay_fee_rate.0)),
            max_pool_vsize: env_or("MAX_POOL_VSIZE", d.max_pool_vsize),
            max_ancestors: env_or("MAX_ANCESTORS", d.max_ancestors),
            max_descendants: env_or("MAX_DESCENDANTS", d.max_descendants),
            max_ancestor_vsize: env_or("MAX_ANCESTOR_VSIZE", d.max_ancestor_vsize),
            max_descendant_vsize: env_or("MAX_DESCENDANT_VSIZE", d.max_descendant_vsize),
            coinbase_maturity: env_or("COINBASE_MATURITY", d.coinbase_maturity),
            enable_rbf: env::var(format!("{ENV_PREFIX}ENABLE_RBF"))
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(d.enable_rbf),
            max_replacements: env_or("MAX_REPLACEMENTS", d.max_replacements),
            max_op_return_bytes: env_or("MAX_OP_RETURN_BYTES", d.max_op_return_bytes),
        }
    }

    /// Rejects settings that would make every admission fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_package_count", self.max_package_count),
            ("max_package_vsize", self.max_package_vsize),
            ("max_standard_tx_weight", self.max_standard_tx_weight),
            ("max_pool_vsize", self.max_pool_vsize),
            ("max_ancestors", self.max_ancestors),
            ("max_descendants", self.max_descendants),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::MustBePositive(*field));
        }
        for (field, rate) in [
            ("min_relay_fee_rate", self.min_relay_fee_rate),
            ("incremental_relay_fee_rate", self.incremental_relay_fee_rate),
            ("dust_relay_fee_rate", self.dust_relay_fee_rate),
        ] {
            if rate.0 < 0 {
                return Err(ConfigError::NegativeFeeRate(field));
            }
        }
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(format!("{ENV_PREFIX}{key}"))
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
