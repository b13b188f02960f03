//! # Domain Entities
//!
//! Key material and encoding constants for signatures.

use std::fmt;

use k256::ecdsa::SigningKey;
use shared_types::{pubkey_hash, PubKeyHash, Script};

use super::errors::ScriptError;

/// The only supported sighash type: commit to all inputs and outputs.
pub const SIGHASH_ALL: u8 = 0x01;

/// Compact `r || s` signature followed by the sighash byte.
pub const SIGNATURE_LEN: usize = 65;

/// SEC1 compressed public key length.
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// A secp256k1 signing key with its compressed public key.
pub struct Keypair {
    signing_key: SigningKey,
    public_key: Vec<u8>,
}

impl Keypair {
    /// Builds a keypair from a 32-byte secret scalar.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Result<Self, ScriptError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| ScriptError::InvalidSecretKey)?;
        let public_key = signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec();
        Ok(Self {
            signing_key,
            public_key,
        })
    }

    /// Compressed SEC1 public key.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    pub fn pubkey_hash(&self) -> PubKeyHash {
        pubkey_hash(&self.public_key)
    }

    /// Pay-to-pubkey-hash output script for this key.
    pub fn p2pkh_script(&self) -> Script {
        Script::new_p2pkh(&self.pubkey_hash())
    }

    /// Witness v0 pubkey-hash output script for this key.
    pub fn p2wpkh_script(&self) -> Script {
        Script::new_p2wpkh(&self.pubkey_hash())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey_hash", &self.pubkey_hash())
            .finish_non_exhaustive()
    }
}
