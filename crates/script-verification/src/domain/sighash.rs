//! # Signature Hash
//!
//! The message an input signature commits to.
//!
//! ```text
//! version | n_in | { outpoint | sequence }* | n_out | { output }* | lock_time
//!         | input_index:u32le | spent.value:i64le | spent.script_pubkey | sighash_type:u32le
//! ```
//!
//! Unlocking scripts and witnesses are excluded so inputs can be signed in
//! any order.

use shared_types::encoding::{write_compact_size, write_output};
use shared_types::{sha256d, MutableTransaction, TxOut};

use super::entities::SIGHASH_ALL;
use super::errors::ScriptError;

/// Computes the signature hash for input `input_index` spending `spent`.
pub fn signature_hash(
    tx: &MutableTransaction,
    input_index: usize,
    spent: &TxOut,
) -> Result<[u8; 32], ScriptError> {
    if input_index >= tx.inputs.len() {
        return Err(ScriptError::InputIndexOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        });
    }

    let mut preimage = Vec::with_capacity(128 + tx.inputs.len() * 40 + tx.outputs.len() * 34);
    preimage.extend_from_slice(&tx.version.to_le_bytes());

    write_compact_size(&mut preimage, tx.inputs.len() as u64);
    for input in &tx.inputs {
        preimage.extend_from_slice(input.previous_output.txid.as_bytes());
        preimage.extend_from_slice(&input.previous_output.vout.to_le_bytes());
        preimage.extend_from_slice(&input.sequence.to_le_bytes());
    }

    write_compact_size(&mut preimage, tx.outputs.len() as u64);
    for output in &tx.outputs {
        write_output(&mut preimage, output);
    }

    preimage.extend_from_slice(&tx.lock_time.to_le_bytes());
    preimage.extend_from_slice(&(input_index as u32).to_le_bytes());
    write_output(&mut preimage, spent);
    preimage.extend_from_slice(&u32::from(SIGHASH_ALL).to_le_bytes());

    Ok(sha256d(&preimage))
}
