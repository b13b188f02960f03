//! # Consensus Encoding
//!
//! Byte layout used for identity hashes and size metrics:
//!
//! ```text
//! version:i32le [marker:0x00 flag:0x01] vin_count:cs { txid:32 vout:u32le script_sig:cs+bytes sequence:u32le }*
//! vout_count:cs { value:i64le script_pubkey:cs+bytes }* [witness per input: count:cs { len:cs bytes }*] lock_time:u32le
//! ```
//!
//! `cs` is the CompactSize variable-length integer. The bracketed witness
//! parts are present only in the witness encoding of a transaction that has
//! at least one non-empty witness.

use crate::entities::{MutableTransaction, TxIn, TxOut};

/// Number of bytes needed to encode `n` as a CompactSize.
pub fn compact_size_len(n: u64) -> usize {
    match n {
        0..=0xfc => 1,
        0xfd..=0xffff => 3,
        0x1_0000..=0xffff_ffff => 5,
        _ => 9,
    }
}

/// Appends `n` as a CompactSize.
pub fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

fn write_input(out: &mut Vec<u8>, input: &TxIn) {
    out.extend_from_slice(input.previous_output.txid.as_bytes());
    out.extend_from_slice(&input.previous_output.vout.to_le_bytes());
    write_bytes(out, input.script_sig.as_bytes());
    out.extend_from_slice(&input.sequence.to_le_bytes());
}

/// Appends the encoding of one output.
pub fn write_output(out: &mut Vec<u8>, output: &TxOut) {
    out.extend_from_slice(&output.value.to_le_bytes());
    write_bytes(out, output.script_pubkey.as_bytes());
}

/// Encodes a transaction, with or without its witness section.
pub fn encode_transaction(tx: &MutableTransaction, include_witness: bool) -> Vec<u8> {
    let with_witness = include_witness && tx.has_witness();
    let mut out = Vec::new();

    out.extend_from_slice(&tx.version.to_le_bytes());
    if with_witness {
        out.extend_from_slice(&[0x00, 0x01]);
    }

    write_compact_size(&mut out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        write_input(&mut out, input);
    }

    write_compact_size(&mut out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        write_output(&mut out, output);
    }

    if with_witness {
        for input in &tx.inputs {
            write_compact_size(&mut out, input.witness.len() as u64);
            for item in &input.witness {
                write_bytes(&mut out, item);
            }
        }
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
    out
}
