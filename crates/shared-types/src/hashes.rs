//! # Typed Hashes
//!
//! Identity hashes for transactions and key hashes for spending conditions.
//!
//! `Txid` and `Wtxid` share a representation but not a type: spend references
//! and conflict detection use `Txid`, while result maps and relay use `Wtxid`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use crate::errors::TypesError;

/// Double SHA-256.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

fn parse_hash(s: &str) -> Result<[u8; 32], TypesError> {
    let bytes = hex::decode(s).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
    if bytes.len() != 32 {
        return Err(TypesError::InvalidHashLength(bytes.len()));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! define_hash {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[serde_as]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        pub struct $name(#[serde_as(as = "Hex")] pub [u8; 32]);

        impl $name {
            /// The all-zero hash.
            pub const ZERO: Self = Self([0u8; 32]);

            /// Wraps raw hash bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Returns the raw hash bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Returns the first four bytes as hex, for log lines.
            pub fn short(&self) -> String {
                hex::encode(&self.0[..4])
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = TypesError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_hash(s).map(Self)
            }
        }
    };
}

define_hash!(
    /// Transaction identity hash, computed over the encoding without witness data.
    Txid
);

define_hash!(
    /// Witness transaction hash, computed over the full encoding including witness data.
    Wtxid
);

/// 20-byte hash of a compressed public key, committed to by key-hash outputs.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct PubKeyHash(#[serde_as(as = "Hex")] pub [u8; 20]);

/// Derives the key hash of a SEC1-encoded public key.
///
/// Last 20 bytes of keccak256, the same derivation the signer uses for
/// account addresses.
pub fn pubkey_hash(pubkey: &[u8]) -> PubKeyHash {
    let digest = Keccak256::digest(pubkey);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    PubKeyHash(out)
}
