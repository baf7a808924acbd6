//! # Error Types
//!
//! Error tier shared by all subsystems, plus parsing errors for the shared
//! entities.

use thiserror::Error;

/// Classification of every error raised while processing a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorTier {
    /// Expected, data-dependent failure. Only the offending entry, transfer or
    /// call is rejected; processing continues with the next unit of work.
    Semantic,
    /// Unexpected failure (storage, sandbox trap, assertion). The current unit
    /// of work is aborted and the chain must stop.
    Infrastructure,
}

impl ErrorTier {
    /// Returns true if processing of the chain must stop.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::Infrastructure)
    }
}

/// Errors parsing a human-readable address string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Not valid base58.
    #[error("invalid base58 encoding")]
    InvalidEncoding,

    /// Decoded payload has the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Wrong two-byte prefix for this address kind.
    #[error("invalid prefix: {0:02x?}")]
    InvalidPrefix([u8; 2]),

    /// Trailing checksum does not match.
    #[error("invalid checksum")]
    InvalidChecksum,
}

/// Errors constructing a reveal-datum from raw bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RcdError {
    /// Wrong total length.
    #[error("invalid RCD size: expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },

    /// Leading type byte is not RCD type 1.
    #[error("invalid RCD type: 0x{0:02x}")]
    InvalidType(u8),
}

/// Errors encoding an entry to its binary form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryError {
    /// Encoded external ids exceed the u16 size prefix.
    #[error("external ids too large: {0} bytes")]
    ExtIdsTooLarge(usize),
}
