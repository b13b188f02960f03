//! # ECDSA Verification (secp256k1)
//!
//! Signature checks for key-hash spends.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention**: S must be STRICTLY LESS THAN half the curve order
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: Uses `subtle` crate for scalar comparisons
//! - Uses k256 crate for cryptographic operations

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use subtle::{Choice, ConstantTimeEq};

use super::entities::{SIGHASH_ALL, SIGNATURE_LEN};
use super::errors::ScriptError;

/// secp256k1 curve order n
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// n/2, the malleability bound for S.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Verifies a 65-byte `r || s || sighash_type` signature by `pubkey` over
/// `message_hash`.
pub fn verify_signature(
    pubkey: &[u8],
    message_hash: &[u8; 32],
    signature: &[u8],
) -> Result<(), ScriptError> {
    if signature.len() != SIGNATURE_LEN || signature[64] != SIGHASH_ALL {
        return Err(ScriptError::InvalidSignature);
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature[..32]);
    s.copy_from_slice(&signature[32..64]);

    if !is_valid_scalar(&r) || !is_valid_scalar(&s) {
        return Err(ScriptError::InvalidSignature);
    }
    if !is_low_s(&s) {
        return Err(ScriptError::MalleableSignature);
    }

    let verifying_key =
        VerifyingKey::from_sec1_bytes(pubkey).map_err(|_| ScriptError::InvalidPublicKey)?;
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| ScriptError::InvalidSignature)?;

    verifying_key
        .verify_prehash(message_hash, &sig)
        .map_err(|_| ScriptError::VerificationFailed)
}

/// Constant-time `a < b` over big-endian 32-byte integers.
fn ct_less_than(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        less |= not_decided & Choice::from((a[i] < b[i]) as u8);
        greater |= not_decided & Choice::from((a[i] > b[i]) as u8);
    }

    less
}

/// S strictly below half the curve order.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_less_than(s, &SECP256K1_HALF_ORDER).into()
}

/// Scalar in [1, n-1].
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }
    (!is_zero & ct_less_than(scalar, &SECP256K1_ORDER)).into()
}
