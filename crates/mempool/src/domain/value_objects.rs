//! Value objects for the Mempool subsystem.
//!
//! Immutable types used for fee accounting and pool reporting.

use serde::{Deserialize, Serialize};
use shared_types::Amount;
use std::fmt;

/// Fee rate in base units per 1,000 virtual bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeeRate(pub Amount);

impl FeeRate {
    pub const ZERO: Self = Self(0);

    /// Creates a rate from a per-kvB amount.
    pub const fn per_kvb(amount: Amount) -> Self {
        Self(amount)
    }

    /// The rate paid by `fee` over `vsize` virtual bytes.
    pub fn from_fee(fee: Amount, vsize: usize) -> Self {
        if vsize == 0 {
            return Self::ZERO;
        }
        Self(fee.saturating_mul(1_000) / vsize as Amount)
    }

    /// Fee required at this rate for `vsize` virtual bytes.
    ///
    /// A positive rate never rounds a non-empty size down to a zero fee.
    pub fn fee_for(&self, vsize: usize) -> Amount {
        let fee = self.0.saturating_mul(vsize as Amount) / 1_000;
        if fee == 0 && vsize != 0 && self.0 > 0 {
            return 1;
        }
        fee
    }

    pub fn as_per_kvb(&self) -> Amount {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two rates, saturating.
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/kvB", self.0)
    }
}

/// Whether an admission pass may mutate the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationMode {
    /// Admit on success.
    Commit,
    /// Report verdicts only ("test accept").
    DryRun,
}

impl ValidationMode {
    pub fn from_test_accept(test_accept: bool) -> Self {
        if test_accept {
            Self::DryRun
        } else {
            Self::Commit
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Pool summary used by the relay layer to compute its fee filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Number of transactions in the pool.
    pub size: usize,
    /// Sum of virtual sizes.
    pub total_vsize: usize,
    /// Sum of fees.
    pub total_fees: Amount,
    /// Current admission floor.
    pub min_fee_rate: FeeRate,
}
