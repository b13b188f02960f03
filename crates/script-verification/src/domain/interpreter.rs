//! # Template Interpreter
//!
//! Evaluates the unlocking data of one input against the spending condition
//! of the output it consumes.

use shared_types::{pubkey_hash, Instruction, PubKeyHash, ScriptType, Transaction, TxOut};
use subtle::ConstantTimeEq;

use super::ecdsa::verify_signature;
use super::entities::COMPRESSED_PUBKEY_LEN;
use super::errors::ScriptError;
use super::sighash::signature_hash;

/// Verifies input `input_index` of `tx` against the output it spends.
pub fn verify_input(tx: &Transaction, input_index: usize, spent: &TxOut) -> Result<(), ScriptError> {
    let input = tx
        .inputs()
        .get(input_index)
        .ok_or(ScriptError::InputIndexOutOfRange {
            index: input_index,
            count: tx.inputs().len(),
        })?;

    let committed = spent
        .script_pubkey
        .key_hash()
        .ok_or(ScriptError::UnsupportedScript)?;

    let (signature, pubkey) = match spent.script_pubkey.script_type() {
        ScriptType::PubKeyHash => {
            if !input.witness.is_empty() {
                return Err(ScriptError::MalformedUnlock("witness on legacy spend"));
            }
            let pushes = input
                .script_sig
                .instructions()
                .map(|ins| match ins {
                    Ok(Instruction::Push(data)) => Ok(data),
                    _ => Err(ScriptError::MalformedUnlock("script_sig must be pushes")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            match pushes.as_slice() {
                [sig, key] => (sig.to_vec(), key.to_vec()),
                _ => return Err(ScriptError::MalformedUnlock("expected <sig> <pubkey>")),
            }
        }
        ScriptType::WitnessV0KeyHash => {
            if !input.script_sig.is_empty() {
                return Err(ScriptError::MalformedUnlock("script_sig on witness spend"));
            }
            match input.witness.as_slice() {
                [sig, key] => (sig.clone(), key.clone()),
                _ => return Err(ScriptError::MalformedUnlock("expected [sig, pubkey] witness")),
            }
        }
        _ => return Err(ScriptError::UnsupportedScript),
    };

    check_key_hash_spend(tx, input_index, spent, &committed, &signature, &pubkey)
}

fn check_key_hash_spend(
    tx: &Transaction,
    input_index: usize,
    spent: &TxOut,
    committed: &PubKeyHash,
    signature: &[u8],
    pubkey: &[u8],
) -> Result<(), ScriptError> {
    if pubkey.len() != COMPRESSED_PUBKEY_LEN {
        return Err(ScriptError::InvalidPublicKey);
    }
    if !bool::from(pubkey_hash(pubkey).0.ct_eq(&committed.0)) {
        return Err(ScriptError::PubKeyHashMismatch);
    }

    let sighash = signature_hash(tx.data(), input_index, spent)?;
    verify_signature(pubkey, &sighash, signature)
}
