//! JSON fixture format.
//!
//! ```json
//! {
//!   "tip_height": 200,
//!   "coins": [{ "outpoint": { "txid": "..", "vout": 0 },
//!               "output": { "value": 100000000, "script_pubkey": "76a914..88ac" },
//!               "height": 1, "is_coinbase": false }],
//!   "mempool": [],
//!   "package": [{ "version": 2, "inputs": [..], "outputs": [..] }]
//! }
//! ```
//!
//! `mempool` transactions are admitted one by one before the package runs.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use mempool::InMemoryChainState;
use serde::Deserialize;
use shared_types::{Coin, OutPoint, Package, Transaction};

#[derive(Debug, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tip_height: u64,
    #[serde(default)]
    pub coins: Vec<FixtureCoin>,
    #[serde(default)]
    pub mempool: Vec<Transaction>,
    pub package: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureCoin {
    pub outpoint: OutPoint,
    #[serde(flatten)]
    pub coin: Coin,
}

impl Fixture {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid fixture {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn chain_state(&self) -> InMemoryChainState {
        let chain = InMemoryChainState::new(self.tip_height);
        for entry in &self.coins {
            chain.add_coin(entry.outpoint, entry.coin.clone());
        }
        chain
    }

    pub fn package(&self) -> Package {
        self.package.iter().cloned().map(Arc::new).collect()
    }
}
