//! # Chain Processor Errors
//!
//! [`PayloadError`] covers every data-dependent reason a token payload is
//! invalid. [`ProcessError`] is what `process_entry` reports, classified by
//! [`ProcessError::tier`].

use fat_01_entry_authentication::{AuthError, DecodeError};
use fat_02_balance_ledger::LedgerError;
use fat_03_nftokens::{NFTokenError, NFTokenId};
use fat_04_contract_execution::ContractError;
use shared_types::{Address, ErrorTier};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    NFTokens(#[from] NFTokenError),

    #[error("entry belongs to another chain")]
    WrongChain,

    #[error("no addresses")]
    EmptyAmounts,

    #[error("invalid amount (0): {0}")]
    ZeroAmount(Address),

    #[error("duplicate address: {0}")]
    DuplicateAddress(Address),

    #[error("sum of amounts overflows")]
    AmountOverflow,

    #[error("sum(inputs) != sum(outputs): {inputs} != {outputs}")]
    SumMismatch { inputs: u64, outputs: u64 },

    #[error("{0} appears in both inputs and outputs")]
    AddressInBoth(Address),

    #[error("coinbase must be the only input")]
    CoinbaseNotSoleInput,

    #[error("invalid supply: {0}")]
    InvalidSupply(i64),

    #[error("invalid precision: {0}")]
    InvalidPrecision(u32),

    #[error("precision is only valid for FAT-0")]
    PrecisionNotAllowed,

    #[error("coinbase exceeds max supply: {requested} requested, {remaining} remaining")]
    SupplyExceeded { requested: u64, remaining: u64 },

    /// Signing RCDs do not match the addresses that must authorize the entry.
    #[error("invalid signer set: expected {expected} signers, got {actual}")]
    InvalidSigners { expected: usize, actual: usize },

    #[error("NFTokenID {token} is not owned by {address}")]
    NotOwner { token: NFTokenId, address: Address },

    #[error("NFTokenID {0} already exists")]
    TokenExists(NFTokenId),

    #[error("invalid contract call: {0}")]
    InvalidContractCall(&'static str),

    #[error("no contract at {0}")]
    UnknownContract(Address),
}

/// Failure to process one entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProcessError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ProcessError {
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::Auth(e) => e.tier(),
            Self::Payload(_) => ErrorTier::Semantic,
            Self::Ledger(e) => e.tier(),
            Self::Contract(e) => e.tier(),
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Semantic errors are shown verbatim; infrastructure errors are opaque.
    pub fn public_message(&self) -> String {
        match self.tier() {
            ErrorTier::Semantic => self.to_string(),
            ErrorTier::Infrastructure => "internal error".to_string(),
        }
    }
}

impl From<DecodeError> for ProcessError {
    fn from(e: DecodeError) -> Self {
        Self::Payload(e.into())
    }
}

impl From<NFTokenError> for ProcessError {
    fn from(e: NFTokenError) -> Self {
        Self::Payload(e.into())
    }
}
