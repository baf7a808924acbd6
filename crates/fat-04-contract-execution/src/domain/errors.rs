//! # Contract Errors

use fat_02_balance_ledger::LedgerError;
use shared_types::ErrorTier;
use thiserror::Error;

/// How a sandbox invocation ended abnormally.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SandboxFault {
    #[error("execution limit exceeded")]
    ExecLimitExceeded,

    /// Execution aborted; the reason may be a host signal.
    #[error("trap: {0}")]
    Trap(String),
}

/// Result of a failed [`call`](crate::call).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("revert: {0}")]
    Reverted(String),

    #[error("execution limit exceeded")]
    ExecLimitExceeded,

    /// Unexpected sandbox failure.
    #[error("sandbox trap: {0}")]
    Trap(String),

    /// A host hook failed for a reason other than a revert.
    #[error("host fault: {0}")]
    Fault(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ContractError {
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::UnknownFunction(_) | Self::Reverted(_) | Self::ExecLimitExceeded => {
                ErrorTier::Semantic
            }
            Self::Trap(_) | Self::Fault(_) => ErrorTier::Infrastructure,
            Self::Ledger(e) => e.tier(),
        }
    }
}
