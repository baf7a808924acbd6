//! # NFToken Errors

use crate::domain::tokens::NFTokenId;
use fat_01_entry_authentication::DecodeError;
use shared_types::{Address, AddressError, ErrorTier};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NFTokenError {
    /// A map, or a token list in JSON, holds nothing.
    #[error("empty")]
    Empty,

    #[error("duplicate NFTokenID: {0}")]
    DuplicateId(NFTokenId),

    #[error("invalid NFTokenID range: min {min} > max {max}")]
    InvalidRange { min: NFTokenId, max: NFTokenId },

    #[error("NFTokenID max capacity ({limit}) exceeded")]
    CapacityExceeded { limit: usize },

    /// One id owned by two addresses.
    #[error("duplicate NFTokenID: {id}: {first} and {second}")]
    Intersection {
        id: NFTokenId,
        first: Address,
        second: Address,
    },

    #[error("duplicate address: {0}")]
    DuplicateAddress(Address),

    #[error("invalid address {key:?}: {source}")]
    InvalidAddress { key: String, source: AddressError },

    #[error("number of NFTokenIDs differ: {left} != {right}")]
    CountMismatch { left: usize, right: usize },

    #[error("missing NFTokenID: {0}")]
    MissingId(NFTokenId),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl NFTokenError {
    pub fn tier(&self) -> ErrorTier {
        ErrorTier::Semantic
    }
}

impl From<serde_json::Error> for NFTokenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.into())
    }
}
