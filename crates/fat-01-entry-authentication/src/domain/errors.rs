//! # Authentication Errors
//!
//! Every error here is a semantic rejection of the offending entry.

use shared_types::{EntryError, ErrorTier};
use thiserror::Error;

/// Errors raised while validating or producing the external ids of an entry.
///
/// `pair` is the 0-based index of the RCD/signature pair.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// External-id count is not odd or is below 3.
    #[error("invalid number of external ids: {0}")]
    InvalidExtIdCount(usize),

    #[error("pair {pair}: invalid RCD size {size}")]
    InvalidRcdSize { pair: usize, size: usize },

    #[error("pair {pair}: invalid RCD type 0x{rcd_type:02x}")]
    InvalidRcdType { pair: usize, rcd_type: u8 },

    #[error("pair {pair}: invalid signature size {size}")]
    InvalidSignatureSize { pair: usize, size: usize },

    /// The leading external id is not a base-10 integer of seconds.
    #[error("timestamp salt: {0}")]
    InvalidTimestampSalt(String),

    /// Salt and entry timestamp are more than 12 hours apart.
    #[error("timestamp salt expired: {diff_secs}s from entry timestamp")]
    TimestampSaltExpired { diff_secs: i64 },

    #[error("pair {pair}: invalid signature")]
    InvalidSignature { pair: usize },

    /// Signing requires at least one key.
    #[error("empty signer set")]
    EmptySignerSet,

    /// The signed entry has no binary form.
    #[error(transparent)]
    Entry(#[from] EntryError),
}

impl AuthError {
    /// Authentication failures only ever reject the entry.
    pub fn tier(&self) -> ErrorTier {
        ErrorTier::Semantic
    }

    /// Index of the pair that failed, if the error is pair-specific.
    pub fn pair(&self) -> Option<usize> {
        match self {
            Self::InvalidRcdSize { pair, .. }
            | Self::InvalidRcdType { pair, .. }
            | Self::InvalidSignatureSize { pair, .. }
            | Self::InvalidSignature { pair } => Some(*pair),
            _ => None,
        }
    }
}

/// Errors raised by strict JSON content decoding.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Input is empty, malformed, or holds trailing data after one value.
    #[error("not a single valid JSON: {0}")]
    NotSingleJson(String),

    /// An object repeats a key.
    #[error("duplicate JSON key: {0:?}")]
    DuplicateKey(String),

    /// Typed decoding failed (unknown field, wrong type, invalid value).
    #[error("{0}")]
    Json(String),

    /// A decoded value failed to re-encode while computing its length.
    #[error("value has no JSON encoding: {0}")]
    Unencodable(String),

    /// Canonical input length differs from what the decoded value accounts for.
    #[error("content JSON length ({actual}) != expected JSON length ({expected})")]
    LengthMismatch { expected: usize, actual: usize },
}

impl DecodeError {
    pub fn tier(&self) -> ErrorTier {
        ErrorTier::Semantic
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
