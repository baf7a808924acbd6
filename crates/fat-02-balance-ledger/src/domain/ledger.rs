//! # Balance Ledger
//!
//! Credit/debit over a [`LedgerStore`], nested checkpoints, audit trail and
//! NFToken owner records.

use crate::domain::entities::{
    AddressId, AddressTransaction, Direction, EntryId, NFTokenId, COINBASE_ID,
};
use crate::domain::errors::{LedgerError, StoreError};
use crate::ports::LedgerStore;
use shared_types::Address;
use tracing::{debug, error};

/// An open nested savepoint. Close it with [`BalanceLedger::commit`] or
/// [`BalanceLedger::rollback`].
#[must_use = "a checkpoint must be committed or rolled back"]
#[derive(Debug, PartialEq, Eq)]
pub struct Checkpoint {
    depth: usize,
}

impl Checkpoint {
    /// Nesting level, 1 for the outermost checkpoint.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Balances of one token chain.
pub struct BalanceLedger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> BalanceLedger<S> {
    /// Open the ledger, creating the coinbase row as id 1 if absent.
    pub fn open(mut store: S) -> Result<Self, LedgerError> {
        let coinbase = Address::coinbase();
        let id = match store.select_address(&coinbase)? {
            Some(record) => record.id,
            None => store.upsert_add_balance(&coinbase, 0)?,
        };
        if id != COINBASE_ID {
            error!(id, "Coinbase address does not have the reserved id");
            return Err(LedgerError::ConsistencyViolation(format!(
                "coinbase address has id {id}, expected {COINBASE_ID}"
            )));
        }
        Ok(Self { store })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Add `amount` to the balance of `address`, creating the row if absent.
    ///
    /// `amount` may be zero to only guarantee the row exists.
    pub fn credit(&mut self, address: &Address, amount: u64) -> Result<AddressId, LedgerError> {
        match self.store.upsert_add_balance(address, amount) {
            Ok(id) => {
                debug!(%address, amount, id, "Credited");
                Ok(id)
            }
            Err(StoreError::Overflow) => Err(LedgerError::BalanceOverflow { address: *address }),
            Err(e) => Err(e.into()),
        }
    }

    /// Subtract `amount` from the balance of `address`.
    ///
    /// A zero `amount` behaves as `credit(address, 0)`. Fails with
    /// [`LedgerError::InsufficientBalance`] and leaves the balance untouched
    /// if the address is absent or holds less than `amount`.
    pub fn debit(&mut self, address: &Address, amount: u64) -> Result<AddressId, LedgerError> {
        if amount == 0 {
            return self.credit(address, 0);
        }

        let Some(record) = self.store.select_address(address)? else {
            return Err(LedgerError::InsufficientBalance { address: *address });
        };

        match self.store.subtract_balance(record.id, amount) {
            Ok(0) => {
                error!(%address, id = record.id, "No balances updated");
                Err(LedgerError::ConsistencyViolation(format!(
                    "no balances updated for {address}"
                )))
            }
            Ok(_) => {
                debug!(%address, amount, id = record.id, "Debited");
                Ok(record.id)
            }
            Err(StoreError::ConstraintCheck) => {
                Err(LedgerError::InsufficientBalance { address: *address })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Append an audit edge; returns its id.
    pub fn record_transaction(
        &mut self,
        address_id: AddressId,
        entry_id: EntryId,
        direction: Direction,
    ) -> Result<u64, LedgerError> {
        Ok(self
            .store
            .insert_address_transaction(address_id, entry_id, direction)?)
    }

    /// Audit history of `address`, oldest first. Empty if unknown.
    pub fn transactions_of(
        &self,
        address: &Address,
    ) -> Result<Vec<AddressTransaction>, LedgerError> {
        match self.store.select_address(address)? {
            Some(record) => Ok(self.store.address_transactions(record.id)?),
            None => Ok(Vec::new()),
        }
    }

    /// `(id, balance)` of `address`, or `None` if it was never credited.
    pub fn balance_of(&self, address: &Address) -> Result<Option<(AddressId, u64)>, LedgerError> {
        Ok(self
            .store
            .select_address(address)?
            .map(|record| (record.id, record.balance)))
    }

    /// Number of addresses excluding the coinbase.
    pub fn circulating_count(&self, non_zero_only: bool) -> Result<u64, LedgerError> {
        Ok(self.store.count_addresses(non_zero_only)?)
    }

    pub fn nftoken_owner(&self, token: NFTokenId) -> Result<Option<AddressId>, LedgerError> {
        Ok(self.store.nftoken_owner(token)?)
    }

    pub fn assign_nftoken(
        &mut self,
        token: NFTokenId,
        owner: AddressId,
    ) -> Result<(), LedgerError> {
        Ok(self.store.set_nftoken_owner(token, owner)?)
    }

    // =========================================================================
    // CHAIN STATE
    // =========================================================================

    pub fn issuance_record(&self) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.store.issuance_record()?)
    }

    pub fn set_issuance_record(&mut self, issuance: &[u8]) -> Result<(), LedgerError> {
        Ok(self.store.set_issuance_record(issuance)?)
    }

    pub fn issued_supply(&self) -> Result<u64, LedgerError> {
        Ok(self.store.issued_supply()?)
    }

    pub fn set_issued_supply(&mut self, issued: u64) -> Result<(), LedgerError> {
        Ok(self.store.set_issued_supply(issued)?)
    }

    // =========================================================================
    // CHECKPOINTS
    // =========================================================================

    /// Open a nested checkpoint.
    pub fn checkpoint(&mut self) -> Result<Checkpoint, LedgerError> {
        self.store.savepoint()?;
        Ok(Checkpoint {
            depth: self.store.savepoint_depth(),
        })
    }

    /// Keep every write made since `checkpoint`.
    pub fn commit(&mut self, checkpoint: Checkpoint) -> Result<(), LedgerError> {
        self.expect_innermost(&checkpoint)?;
        Ok(self.store.release()?)
    }

    /// Discard every write made since `checkpoint`.
    pub fn rollback(&mut self, checkpoint: Checkpoint) -> Result<(), LedgerError> {
        self.expect_innermost(&checkpoint)?;
        Ok(self.store.rollback_to()?)
    }

    /// Run `f` under a checkpoint, committing on `Ok` and rolling back on
    /// `Err`.
    pub fn atomically<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<LedgerError>,
    {
        let checkpoint = self.checkpoint()?;
        match f(self) {
            Ok(value) => {
                self.commit(checkpoint)?;
                Ok(value)
            }
            Err(e) => {
                self.rollback(checkpoint)?;
                Err(e)
            }
        }
    }

    fn expect_innermost(&self, checkpoint: &Checkpoint) -> Result<(), LedgerError> {
        let depth = self.store.savepoint_depth();
        if checkpoint.depth != depth {
            error!(
                checkpoint = checkpoint.depth,
                depth, "Checkpoint closed out of order"
            );
            return Err(LedgerError::ConsistencyViolation(format!(
                "checkpoint at depth {} closed while depth is {depth}",
                checkpoint.depth
            )));
        }
        Ok(())
    }
}
