//! # Input Signer
//!
//! Produces unlocking data for key-hash outputs. Used by wallets, fixtures
//! and tests; the admission path only verifies.

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::Signature;
use shared_types::{MutableTransaction, Script, ScriptType, TxOut};

use super::entities::{Keypair, SIGHASH_ALL, SIGNATURE_LEN};
use super::errors::ScriptError;
use super::sighash::signature_hash;

/// Signs input `input_index` of `tx`, which spends `spent`.
///
/// P2PKH spends get `<sig> <pubkey>` in the script_sig; P2WPKH spends get
/// the same two items in the witness and an empty script_sig.
pub fn sign_input(
    tx: &mut MutableTransaction,
    input_index: usize,
    spent: &TxOut,
    keypair: &Keypair,
) -> Result<(), ScriptError> {
    let script_type = spent.script_pubkey.script_type();
    if !matches!(
        script_type,
        ScriptType::PubKeyHash | ScriptType::WitnessV0KeyHash
    ) {
        return Err(ScriptError::UnsupportedScript);
    }

    let sighash = signature_hash(tx, input_index, spent)?;
    let signature: Signature = keypair
        .signing_key()
        .sign_prehash(&sighash)
        .map_err(|_| ScriptError::InvalidSignature)?;
    let signature = signature.normalize_s().unwrap_or(signature);

    let mut encoded = Vec::with_capacity(SIGNATURE_LEN);
    encoded.extend_from_slice(&signature.to_bytes());
    encoded.push(SIGHASH_ALL);

    let input = &mut tx.inputs[input_index];
    if script_type == ScriptType::PubKeyHash {
        input.script_sig = Script::from_pushes([encoded.as_slice(), keypair.public_key()]);
        input.witness.clear();
    } else {
        input.script_sig = Script::default();
        input.witness = vec![encoded, keypair.public_key().to_vec()];
    }
    Ok(())
}
