//! # Structural and Standardness Rules
//!
//! Context-free checks on a single transaction.
//!
//! - [`check_transaction`]: consensus rules every block must obey.
//! - [`check_standard`]: local relay policy; failing it does not make a
//!   transaction invalid in a block.

use super::entities::MempoolConfig;
use super::value_objects::FeeRate;
use super::verdict::{RejectReason, TxRejection};
use shared_types::{
    money_range, Amount, OutPoint, ScriptType, Transaction, TxOut, MAX_MONEY,
};
use std::collections::HashSet;

/// Consensus weight limit of a block, and so of any transaction.
pub const MAX_BLOCK_WEIGHT: usize = 4_000_000;

/// Largest standard unlocking script.
pub const MAX_STANDARD_SCRIPTSIG_SIZE: usize = 1_650;

/// Highest transaction version relayed.
pub const MAX_STANDARD_VERSION: i32 = 2;

/// Input size assumed when pricing a legacy output's future spend.
const LEGACY_SPEND_SIZE: usize = 32 + 4 + 1 + 107 + 4;

/// Input size assumed for a witness output's future spend (witness discounted).
const WITNESS_SPEND_SIZE: usize = 32 + 4 + 1 + (107 / 4) + 4;

/// Context-free consensus checks.
pub fn check_transaction(tx: &Transaction) -> Result<(), TxRejection> {
    if tx.inputs().is_empty() {
        return Err(RejectReason::VinEmpty.into());
    }
    if tx.outputs().is_empty() {
        return Err(RejectReason::VoutEmpty.into());
    }
    if tx.weight() > MAX_BLOCK_WEIGHT {
        return Err(TxRejection::new(
            RejectReason::Oversize,
            format!("weight {}", tx.weight()),
        ));
    }

    let mut total: Amount = 0;
    for (index, output) in tx.outputs().iter().enumerate() {
        if output.value < 0 {
            return Err(TxRejection::new(
                RejectReason::VoutNegative,
                format!("output {index}"),
            ));
        }
        if output.value > MAX_MONEY {
            return Err(TxRejection::new(
                RejectReason::VoutTooLarge,
                format!("output {index}"),
            ));
        }
        total += output.value;
        if !money_range(total) {
            return Err(RejectReason::TxOutTotalTooLarge.into());
        }
    }

    let mut seen: HashSet<&OutPoint> = HashSet::with_capacity(tx.inputs().len());
    if !tx
        .inputs()
        .iter()
        .all(|input| seen.insert(&input.previous_output))
    {
        return Err(RejectReason::InputsDuplicate.into());
    }

    if !tx.is_coinbase() {
        if let Some(index) = tx
            .inputs()
            .iter()
            .position(|input| input.previous_output.is_null())
        {
            return Err(TxRejection::new(
                RejectReason::PrevoutNull,
                format!("input {index}"),
            ));
        }
    }

    Ok(())
}

/// Relay policy checks.
pub fn check_standard(tx: &Transaction, config: &MempoolConfig) -> Result<(), TxRejection> {
    if !(1..=MAX_STANDARD_VERSION).contains(&tx.version()) {
        return Err(TxRejection::new(
            RejectReason::Version,
            format!("version {}", tx.version()),
        ));
    }

    if tx.weight() > config.max_standard_tx_weight {
        return Err(TxRejection::new(
            RejectReason::TxSize,
            format!(
                "weight {} > {}",
                tx.weight(),
                config.max_standard_tx_weight
            ),
        ));
    }

    for (index, input) in tx.inputs().iter().enumerate() {
        if input.script_sig.len() > MAX_STANDARD_SCRIPTSIG_SIZE {
            return Err(TxRejection::new(
                RejectReason::ScriptSigSize,
                format!("input {index}: {} bytes", input.script_sig.len()),
            ));
        }
        if !input.script_sig.is_push_only() {
            return Err(TxRejection::new(
                RejectReason::ScriptSigNotPushOnly,
                format!("input {index}"),
            ));
        }
    }

    let mut data_outputs = 0usize;
    for (index, output) in tx.outputs().iter().enumerate() {
        match output.script_pubkey.script_type() {
            ScriptType::NonStandard => {
                return Err(TxRejection::new(
                    RejectReason::ScriptPubKey,
                    format!("output {index}"),
                ));
            }
            ScriptType::NullData => {
                if output.script_pubkey.len() > config.max_op_return_bytes {
                    return Err(TxRejection::new(
                        RejectReason::ScriptPubKey,
                        format!("output {index}: oversized data carrier"),
                    ));
                }
                data_outputs += 1;
            }
            _ => {
                if is_dust(output, config.dust_relay_fee_rate) {
                    return Err(TxRejection::new(
                        RejectReason::Dust,
                        format!(
                            "output {index}: {} < {}",
                            output.value,
                            dust_threshold(output, config.dust_relay_fee_rate)
                        ),
                    ));
                }
            }
        }
    }

    if data_outputs > 1 {
        return Err(RejectReason::MultiOpReturn.into());
    }

    Ok(())
}

/// Smallest value worth relaying for `output`: the fee, at `dust_relay_fee`,
/// of creating and later spending it. Unspendable outputs have no threshold.
pub fn dust_threshold(output: &TxOut, dust_relay_fee: FeeRate) -> Amount {
    if output.script_pubkey.is_unspendable() {
        return 0;
    }
    let spend_size = if output.script_pubkey.is_witness_program() {
        WITNESS_SPEND_SIZE
    } else {
        LEGACY_SPEND_SIZE
    };
    dust_relay_fee.fee_for(output.serialized_size() + spend_size)
}

pub fn is_dust(output: &TxOut, dust_relay_fee: FeeRate) -> bool {
    output.value < dust_threshold(output, dust_relay_fee)
}
