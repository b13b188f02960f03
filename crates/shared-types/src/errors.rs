//! # Error Types
//!
//! Errors raised while building or decoding shared data types.

use thiserror::Error;

/// Errors that can occur when constructing or parsing shared types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypesError {
    /// A hex string could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// A hash had the wrong number of bytes.
    #[error("Invalid hash length: expected 32 bytes, got {0}")]
    InvalidHashLength(usize),

    /// A script push ran past the end of the script.
    #[error("Truncated push at offset {offset}")]
    TruncatedPush { offset: usize },
}
