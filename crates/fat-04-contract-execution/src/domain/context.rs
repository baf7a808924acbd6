//! # Call Context
//!
//! State injected into the sandbox for one call, and the host hooks a
//! contract may use. A hook that stops execution records why in
//! [`CallContext::signal`] and returns a [`SandboxFault`] for the contract to
//! propagate.

use crate::domain::errors::SandboxFault;
use fat_02_balance_ledger::{BalanceLedger, LedgerError, LedgerStore};
use shared_types::{Address, Bytes32, ErrorTier};

/// The transaction that triggered the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallTransaction {
    /// The single input address.
    pub sender: Address,
    /// Address of the contract being called.
    pub contract: Address,
    /// Amount sent to the contract.
    pub amount: u64,
    pub entry_hash: Bytes32,
    /// Entry timestamp, unix seconds.
    pub timestamp: i64,
    /// Token precision from the chain issuance.
    pub precision: u32,
}

/// Why a hook stopped execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostSignal {
    Revert(String),
    SelfDestruct,
    ExecLimitExceeded,
    Fault(String),
}

/// Everything a contract can observe or change during one call.
pub struct CallContext<'a, S: LedgerStore> {
    ledger: &'a mut BalanceLedger<S>,
    height: u32,
    transaction: CallTransaction,
    /// Last error set by a host hook; read after the call returns.
    pub signal: Option<HostSignal>,
    steps_remaining: Option<u64>,
}

impl<'a, S: LedgerStore> CallContext<'a, S> {
    pub fn new(ledger: &'a mut BalanceLedger<S>, height: u32, transaction: CallTransaction) -> Self {
        Self {
            ledger,
            height,
            transaction,
            signal: None,
            steps_remaining: None,
        }
    }

    pub(crate) fn ledger_mut(&mut self) -> &mut BalanceLedger<S> {
        self.ledger
    }

    pub fn transaction(&self) -> &CallTransaction {
        &self.transaction
    }

    /// Limit the steps the rest of this call may consume.
    pub fn set_exec_limit(&mut self, steps: Option<u64>) {
        self.steps_remaining = steps;
    }

    pub fn steps_remaining(&self) -> Option<u64> {
        self.steps_remaining
    }

    /// Charge `steps` against the execution limit.
    pub fn consume(&mut self, steps: u64) -> Result<(), SandboxFault> {
        let Some(remaining) = self.steps_remaining else {
            return Ok(());
        };
        match remaining.checked_sub(steps) {
            Some(left) => {
                self.steps_remaining = Some(left);
                Ok(())
            }
            None => {
                self.steps_remaining = Some(0);
                self.signal = Some(HostSignal::ExecLimitExceeded);
                Err(SandboxFault::ExecLimitExceeded)
            }
        }
    }

    // =========================================================================
    // HOST HOOKS
    // =========================================================================

    pub fn height(&mut self) -> Result<u32, SandboxFault> {
        self.consume(1)?;
        Ok(self.height)
    }

    pub fn sender(&mut self) -> Result<Address, SandboxFault> {
        self.consume(1)?;
        Ok(self.transaction.sender)
    }

    pub fn amount(&mut self) -> Result<u64, SandboxFault> {
        self.consume(1)?;
        Ok(self.transaction.amount)
    }

    pub fn entry_hash(&mut self) -> Result<Bytes32, SandboxFault> {
        self.consume(1)?;
        Ok(self.transaction.entry_hash)
    }

    pub fn timestamp(&mut self) -> Result<i64, SandboxFault> {
        self.consume(1)?;
        Ok(self.transaction.timestamp)
    }

    pub fn precision(&mut self) -> Result<u32, SandboxFault> {
        self.consume(1)?;
        Ok(self.transaction.precision)
    }

    /// Balance of the contract address.
    pub fn balance(&mut self) -> Result<u64, SandboxFault> {
        let contract = self.transaction.contract;
        self.balance_of(&contract)
    }

    /// Balance of any address; zero if never credited.
    pub fn balance_of(&mut self, address: &Address) -> Result<u64, SandboxFault> {
        self.consume(1)?;
        match self.ledger.balance_of(address) {
            Ok(found) => Ok(found.map_or(0, |(_, balance)| balance)),
            Err(e) => Err(self.ledger_fault(e)),
        }
    }

    /// Move `amount` from the contract to `to`.
    pub fn send(&mut self, amount: u64, to: &Address) -> Result<(), SandboxFault> {
        self.consume(1)?;
        let contract = self.transaction.contract;
        if let Err(e) = self.transfer(&contract, to, amount) {
            return Err(self.ledger_fault(e));
        }
        Ok(())
    }

    /// Move `amount` from the contract to the coinbase address.
    pub fn burn(&mut self, amount: u64) -> Result<(), SandboxFault> {
        self.consume(1)?;
        let contract = self.transaction.contract;
        if let Err(e) = self.transfer(&contract, &Address::coinbase(), amount) {
            return Err(self.ledger_fault(e));
        }
        Ok(())
    }

    /// Abort the call and discard its writes.
    pub fn revert(&mut self, reason: impl Into<String>) -> SandboxFault {
        let reason = reason.into();
        self.signal = Some(HostSignal::Revert(reason.clone()));
        SandboxFault::Trap(format!("revert: {reason}"))
    }

    /// End the call successfully, keeping its writes.
    pub fn self_destruct(&mut self) -> SandboxFault {
        self.signal = Some(HostSignal::SelfDestruct);
        SandboxFault::Trap("self destruct".to_string())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u64) -> Result<(), LedgerError> {
        self.ledger.debit(from, amount)?;
        self.ledger.credit(to, amount)?;
        Ok(())
    }

    /// Semantic ledger failures revert; anything else is a fault.
    fn ledger_fault(&mut self, e: LedgerError) -> SandboxFault {
        match e.tier() {
            ErrorTier::Semantic => self.revert(e.to_string()),
            ErrorTier::Infrastructure => {
                let msg = e.to_string();
                self.signal = Some(HostSignal::Fault(msg.clone()));
                SandboxFault::Trap(msg)
            }
        }
    }
}
