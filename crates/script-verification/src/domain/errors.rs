//! # Script Errors
//!
//! Error types for input verification.

use thiserror::Error;

/// Errors that can occur while verifying or signing an input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScriptError {
    /// The spent output uses a template this verifier does not evaluate
    #[error("Unsupported spending condition")]
    UnsupportedScript,

    /// The unlocking data does not have the shape the template requires
    #[error("Malformed unlocking data: {0}")]
    MalformedUnlock(&'static str),

    /// The public key is not a valid SEC1 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// The signature encoding is invalid (wrong length, bad scalars, sighash byte)
    #[error("Invalid signature format")]
    InvalidSignature,

    /// Signature has high S value
    #[error("Malleable signature (high S value)")]
    MalleableSignature,

    /// The public key does not hash to the committed key hash
    #[error("Public key does not match committed key hash")]
    PubKeyHashMismatch,

    /// The signature does not verify against the sighash
    #[error("Signature verification failed")]
    VerificationFailed,

    /// Input index is outside the transaction
    #[error("Input index {index} out of range ({count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// The secret key bytes are not a valid scalar
    #[error("Invalid secret key")]
    InvalidSecretKey,
}
