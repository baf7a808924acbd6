//! # Ledger Errors

use shared_types::{Address, ErrorTier};
use thiserror::Error;

/// Errors raised by a [`LedgerStore`](crate::ports::LedgerStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A balance update would violate `balance >= 0`.
    #[error("CHECK constraint failed: balance >= 0")]
    ConstraintCheck,

    /// A balance update would overflow `u64`.
    #[error("balance overflow")]
    Overflow,

    /// Savepoint release or rollback with none open.
    #[error("no open savepoint")]
    NoSavepoint,

    /// Stored bytes do not decode.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The backend failed (I/O, closed handle).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by [`BalanceLedger`](crate::BalanceLedger).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The address is absent or holds less than the debit.
    #[error("insufficient balance: {address}")]
    InsufficientBalance { address: Address },

    /// A credit would overflow the balance.
    #[error("balance overflow: {address}")]
    BalanceOverflow { address: Address },

    /// A storage result contradicts checks that already passed.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LedgerError {
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::InsufficientBalance { .. } | Self::BalanceOverflow { .. } => ErrorTier::Semantic,
            Self::ConsistencyViolation(_) | Self::Storage(_) => ErrorTier::Infrastructure,
        }
    }

    /// Assertion failures are programming or storage bugs.
    pub fn is_assertion(&self) -> bool {
        matches!(self, Self::ConsistencyViolation(_))
    }

    /// Only transient backend failures may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(StoreError::Unavailable(_)))
    }
}
