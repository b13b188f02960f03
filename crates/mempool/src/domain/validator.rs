//! # Per-Transaction Validator
//!
//! Decides whether one transaction may join the pool given the current
//! [`PackageView`]. The same function serves both validation modes; only the
//! caller decides whether an accepted entry is committed.
//!
//! ## Check Order
//!
//! | Step | Checks | Failure kind |
//! |------|--------|--------------|
//! | 1 | structure, coinbase, standardness | consensus / rejected |
//! | 2 | already pooled, already confirmed, spend conflicts | rejected |
//! | 3 | inputs exist, coinbase maturity, value balance | rejected / consensus |
//! | 4 | scripts, one verifier call per input | consensus |
//! | 5 | chain limits, relay fee, pool floor, replacement | rejected |
//!
//! The first failing check decides the verdict.

use super::entities::MempoolConfig;
use super::policy;
use super::pool::TransactionPool;
use super::value_objects::FeeRate;
use super::verdict::{RejectReason, TxRejection, TxVerdict};
use super::view::{PackageView, Spender};
use crate::ports::outbound::{ChainState, ScriptVerifier};
use rayon::prelude::*;
use shared_types::{money_range, Amount, Transaction, TxOut, Txid};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

/// A transaction that passed every check, ready to be staged or committed.
#[derive(Clone, Debug)]
pub struct AcceptedEntry {
    pub tx: Arc<Transaction>,
    pub fee: Amount,
    pub vsize: usize,
    /// Direct parents, pooled or staged earlier in the package.
    pub parents: BTreeSet<Txid>,
    /// All unconfirmed ancestors.
    pub ancestors: HashSet<Txid>,
    /// Pool entries evicted when this one is committed.
    pub replaced: Vec<Txid>,
}

impl AcceptedEntry {
    pub fn verdict(&self) -> TxVerdict {
        TxVerdict::Valid {
            vsize: self.vsize,
            fee: self.fee,
        }
    }

    pub fn fee_rate(&self) -> FeeRate {
        FeeRate::from_fee(self.fee, self.vsize)
    }
}

/// Everything the validator reads besides the view.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub config: &'a MempoolConfig,
    pub chain: &'a dyn ChainState,
    pub verifier: &'a dyn ScriptVerifier,
    /// Read once per admission pass so every member sees the same tip.
    pub tip_height: u64,
    /// Conflicting pool entries may be replaced rather than refused.
    pub allow_replacement: bool,
}

/// Runs every admission check on `tx` against `view`.
pub fn validate(
    tx: &Arc<Transaction>,
    view: &PackageView<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<AcceptedEntry, TxRejection> {
    policy::check_transaction(tx)?;
    if tx.is_coinbase() {
        return Err(RejectReason::Coinbase.into());
    }
    policy::check_standard(tx, ctx.config)?;

    check_known(tx, view, ctx)?;
    let conflicts = find_conflicts(tx, view, ctx)?;

    let (spent_outputs, parents, fee) = check_inputs(tx, view, ctx)?;
    check_scripts(tx, &spent_outputs, ctx)?;

    let vsize = tx.vsize();
    let ancestors = check_chain_limits(&parents, vsize, view, ctx.config)?;
    check_fees(fee, vsize, view.pool(), ctx.config)?;

    let replaced = if conflicts.is_empty() {
        Vec::new()
    } else {
        let replacement = Replacement {
            fee,
            vsize,
            conflicts: &conflicts,
            parents: &parents,
            ancestors: &ancestors,
        };
        check_replacement(&replacement, view.pool(), ctx.config)?
    };

    Ok(AcceptedEntry {
        tx: Arc::clone(tx),
        fee,
        vsize,
        parents,
        ancestors,
        replaced,
    })
}

fn check_known(
    tx: &Transaction,
    view: &PackageView<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<(), TxRejection> {
    let pool = view.pool();
    if pool.lookup_by_witness(&tx.wtxid()).is_some() {
        return Err(RejectReason::AlreadyInMempool.into());
    }
    if pool.contains(&tx.txid()) {
        return Err(RejectReason::SameNonWitnessDataInMempool.into());
    }
    let confirmed = (0..tx.outputs().len() as u32)
        .any(|vout| ctx.chain.coin(&tx.outpoint(vout)).is_some());
    if confirmed {
        return Err(RejectReason::AlreadyKnown.into());
    }
    Ok(())
}

/// Pool entries spending the same outpoints as `tx`.
fn find_conflicts(
    tx: &Transaction,
    view: &PackageView<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<BTreeSet<Txid>, TxRejection> {
    let mut conflicts = BTreeSet::new();
    for input in tx.inputs() {
        match view.spender_of(&input.previous_output) {
            None => {}
            Some(Spender::Pool(txid)) if ctx.allow_replacement => {
                conflicts.insert(txid);
            }
            Some(Spender::Pool(txid)) | Some(Spender::Staged(txid)) => {
                return Err(TxRejection::new(
                    RejectReason::MempoolConflict,
                    format!("{} already spent by {}", input.previous_output, txid.short()),
                ));
            }
        }
    }
    Ok(conflicts)
}

/// Resolves every input and returns the spent outputs, unconfirmed parents
/// and fee.
fn check_inputs(
    tx: &Transaction,
    view: &PackageView<'_>,
    ctx: &ValidationContext<'_>,
) -> Result<(Vec<TxOut>, BTreeSet<Txid>, Amount), TxRejection> {
    let mut spent_outputs = Vec::with_capacity(tx.inputs().len());
    let mut parents = BTreeSet::new();

    for input in tx.inputs() {
        let outpoint = &input.previous_output;
        if let Some(output) = view.output(outpoint) {
            parents.insert(outpoint.txid);
            spent_outputs.push(output.clone());
            continue;
        }
        let Some(coin) = ctx.chain.coin(outpoint) else {
            return Err(TxRejection::new(
                RejectReason::MissingInputs,
                outpoint.to_string(),
            ));
        };
        if coin.is_coinbase {
            let depth = (ctx.tip_height + 1).saturating_sub(coin.height);
            if depth < ctx.config.coinbase_maturity {
                return Err(TxRejection::new(
                    RejectReason::PrematureCoinbaseSpend,
                    format!("tried to spend coinbase at depth {depth}"),
                ));
            }
        }
        spent_outputs.push(coin.output);
    }

    let mut value_in: Amount = 0;
    for output in &spent_outputs {
        value_in = value_in.saturating_add(output.value);
        if !money_range(output.value) || !money_range(value_in) {
            return Err(RejectReason::InputValuesOutOfRange.into());
        }
    }
    let value_out = tx
        .total_output_value()
        .ok_or(TxRejection::from(RejectReason::TxOutTotalTooLarge))?;
    if value_in < value_out {
        return Err(TxRejection::new(
            RejectReason::InBelowOut,
            format!("value in ({value_in}) < value out ({value_out})"),
        ));
    }

    Ok((spent_outputs, parents, value_in - value_out))
}

/// Verifies all inputs in parallel. The lowest failing index is reported so
/// the verdict does not depend on thread scheduling.
fn check_scripts(
    tx: &Transaction,
    spent_outputs: &[TxOut],
    ctx: &ValidationContext<'_>,
) -> Result<(), TxRejection> {
    let verifier = ctx.verifier;
    let failed = spent_outputs
        .par_iter()
        .enumerate()
        .find_first(|(index, spent)| !verifier.verify_script(tx, *index, spent));

    match failed {
        Some((index, _)) => Err(TxRejection::new(
            RejectReason::ScriptVerifyFailed,
            format!("input {index}"),
        )),
        None => Ok(()),
    }
}

/// Ancestor and descendant limits. Returns the ancestor set on success.
fn check_chain_limits(
    parents: &BTreeSet<Txid>,
    vsize: usize,
    view: &PackageView<'_>,
    config: &MempoolConfig,
) -> Result<HashSet<Txid>, TxRejection> {
    let ancestry = view.ancestry(parents);

    if ancestry.ancestor_count + 1 > config.max_ancestors {
        return Err(TxRejection::new(
            RejectReason::TooLongMempoolChain,
            format!("too many unconfirmed ancestors [limit: {}]", config.max_ancestors),
        ));
    }
    if ancestry.total_ancestor_vsize + vsize > config.max_ancestor_vsize {
        return Err(TxRejection::new(
            RejectReason::TooLongMempoolChain,
            format!("exceeds ancestor size limit [limit: {}]", config.max_ancestor_vsize),
        ));
    }

    for ancestor in &ancestry.ancestor_txids {
        let descendants = view.descendants(ancestor);
        let own_vsize = view.fee_and_vsize(ancestor).map_or(0, |(_, v)| v);
        if descendants.descendant_count + 2 > config.max_descendants {
            return Err(TxRejection::new(
                RejectReason::TooLongMempoolChain,
                format!(
                    "too many descendants for {} [limit: {}]",
                    ancestor.short(),
                    config.max_descendants
                ),
            ));
        }
        if own_vsize + descendants.total_descendant_vsize + vsize > config.max_descendant_vsize {
            return Err(TxRejection::new(
                RejectReason::TooLongMempoolChain,
                format!(
                    "exceeds descendant size limit for {} [limit: {}]",
                    ancestor.short(),
                    config.max_descendant_vsize
                ),
            ));
        }
    }

    Ok(ancestry.ancestor_txids)
}

fn check_fees(
    fee: Amount,
    vsize: usize,
    pool: &TransactionPool,
    config: &MempoolConfig,
) -> Result<(), TxRejection> {
    let relay_floor = config.min_relay_fee_rate.fee_for(vsize);
    if fee < relay_floor {
        return Err(TxRejection::new(
            RejectReason::MinRelayFeeNotMet,
            format!("{fee} < {relay_floor}"),
        ));
    }
    let pool_floor = pool.min_fee_rate().fee_for(vsize);
    if fee < pool_floor {
        return Err(TxRejection::new(
            RejectReason::MempoolMinFeeNotMet,
            format!("{fee} < {pool_floor}"),
        ));
    }
    Ok(())
}

/// A transaction spending outpoints already spent by pool entries.
struct Replacement<'a> {
    fee: Amount,
    vsize: usize,
    conflicts: &'a BTreeSet<Txid>,
    /// Direct parents found in the pool or earlier package members.
    parents: &'a BTreeSet<Txid>,
    ancestors: &'a HashSet<Txid>,
}

/// Replacement rules for `candidate`. Returns every pool entry that would
/// be evicted.
fn check_replacement(
    candidate: &Replacement<'_>,
    pool: &TransactionPool,
    config: &MempoolConfig,
) -> Result<Vec<Txid>, TxRejection> {
    let Replacement {
        fee,
        vsize,
        conflicts,
        parents,
        ancestors,
    } = *candidate;
    let mut replaced: BTreeSet<Txid> = conflicts.clone();
    for conflict in conflicts {
        replaced.extend(pool.descendants_of(conflict).descendant_txids);
    }
    if replaced.len() > config.max_replacements {
        return Err(TxRejection::new(
            RejectReason::TooManyReplacements,
            format!("{} > {}", replaced.len(), config.max_replacements),
        ));
    }

    if let Some(txid) = ancestors.iter().find(|a| replaced.contains(*a)) {
        return Err(TxRejection::new(
            RejectReason::SpendsConflictingTx,
            format!("spends {}", txid.short()),
        ));
    }

    // Unconfirmed inputs must already have been spent by some conflict.
    let conflict_parents: HashSet<Txid> = conflicts
        .iter()
        .filter_map(|conflict| pool.lookup_by_identity(conflict))
        .flat_map(|entry| entry.spends().map(|outpoint| outpoint.txid))
        .collect();
    if let Some(txid) = parents
        .iter()
        .find(|p| !conflict_parents.contains(*p) && pool.lookup_by_identity(p).is_some())
    {
        return Err(TxRejection::new(
            RejectReason::ReplacementAddsUnconfirmed,
            format!("adds unconfirmed input from {}", txid.short()),
        ));
    }

    let new_rate = FeeRate::from_fee(fee, vsize);
    for conflict in conflicts {
        let Some(entry) = pool.lookup_by_identity(conflict) else {
            continue;
        };
        if new_rate <= entry.fee_rate() {
            return Err(TxRejection::new(
                RejectReason::InsufficientFee,
                format!(
                    "rate {new_rate} <= {} of {}",
                    entry.fee_rate(),
                    conflict.short()
                ),
            ));
        }
    }

    let replaced_fees: Amount = replaced
        .iter()
        .filter_map(|txid| pool.lookup_by_identity(txid))
        .map(|entry| entry.fee())
        .sum();
    if fee < replaced_fees {
        return Err(TxRejection::new(
            RejectReason::InsufficientFee,
            format!("less fees than replaced: {fee} < {replaced_fees}"),
        ));
    }
    let bump = config.incremental_relay_fee_rate.fee_for(vsize);
    if fee - replaced_fees < bump {
        return Err(TxRejection::new(
            RejectReason::InsufficientFee,
            format!("not enough additional fees: {} < {bump}", fee - replaced_fees),
        ));
    }

    Ok(replaced.into_iter().collect())
}
