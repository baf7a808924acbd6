//! Shared fixtures: deterministic keys, one chain id, entry builders and a
//! store that can be made to fail on demand.

use anyhow::Result;
use fat_01_entry_authentication::{sign_entry, Signer};
use fat_02_balance_ledger::{
    AddressId, AddressRecord, AddressTransaction, BalanceLedger, Direction, EntryId,
    InMemoryLedgerStore, LedgerStore, NFTokenId, StoreError,
};
use fat_05_chain_processor::ChainProcessor;
use shared_types::{Address, Bytes32, Entry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const CHAIN_ID: Bytes32 = [0x7A; 32];

pub fn issuer() -> Signer {
    Signer::from_seed([0x42; 32])
}

pub fn user(seed: u8) -> Signer {
    Signer::from_seed([seed; 32])
}

pub fn signed(content: &str, signers: &[Signer]) -> Result<Entry> {
    Ok(sign_entry(content.as_bytes().to_vec(), CHAIN_ID, signers)?)
}

pub fn fat0_issuance(supply: i64) -> String {
    format!(r#"{{"type":"FAT-0","supply":{supply}}}"#)
}

pub fn fat1_issuance(supply: i64) -> String {
    format!(r#"{{"type":"FAT-1","supply":{supply}}}"#)
}

pub fn fat0_transfer(from: Address, to: Address, amount: u64) -> String {
    format!(r#"{{"inputs":{{"{from}":{amount}}},"outputs":{{"{to}":{amount}}}}}"#)
}

/// FAT-1 transfer of `ids`, written in the compact list form.
pub fn fat1_transfer(from: Address, to: Address, ids: &[NFTokenId]) -> String {
    let ids = ids
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!(r#"{{"inputs":{{"{from}":[{ids}]}},"outputs":{{"{to}":[{ids}]}}}}"#)
}

pub fn contract_call(from: Address, contract: Address, amount: u64, func: &str) -> String {
    format!(
        r#"{{"inputs":{{"{from}":{amount}}},"outputs":{{"{contract}":{amount}}},"contract":{{"func":"{func}","args":[]}}}}"#
    )
}

pub fn memory_processor() -> Result<ChainProcessor<InMemoryLedgerStore>> {
    let ledger = BalanceLedger::open(InMemoryLedgerStore::new())?;
    Ok(ChainProcessor::open(CHAIN_ID, issuer().rcd(), ledger)?)
}

/// Current balance, zero for unknown addresses.
pub fn balance_of<S: LedgerStore>(processor: &ChainProcessor<S>, address: &Address) -> Result<u64> {
    Ok(processor
        .ledger()
        .balance_of(address)?
        .map_or(0, |(_, balance)| balance))
}

/// In-memory store whose writes fail with
/// [`StoreError::Unavailable`] while the shared switch is on.
///
/// Savepoint handling keeps working so a failed entry still rolls back.
#[derive(Debug, Default)]
pub struct FaultyStore {
    inner: InMemoryLedgerStore,
    fail_writes: Arc<AtomicBool>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that toggles failure after the store has moved into a ledger.
    pub fn switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_writes)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk detached".to_string()));
        }
        Ok(())
    }
}

impl LedgerStore for FaultyStore {
    fn select_address(&self, address: &Address) -> Result<Option<AddressRecord>, StoreError> {
        self.inner.select_address(address)
    }

    fn upsert_add_balance(&mut self, address: &Address, add: u64) -> Result<AddressId, StoreError> {
        self.check()?;
        self.inner.upsert_add_balance(address, add)
    }

    fn subtract_balance(&mut self, id: AddressId, sub: u64) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.subtract_balance(id, sub)
    }

    fn insert_address_transaction(
        &mut self,
        address_id: AddressId,
        entry_id: EntryId,
        direction: Direction,
    ) -> Result<u64, StoreError> {
        self.check()?;
        self.inner
            .insert_address_transaction(address_id, entry_id, direction)
    }

    fn address_transactions(
        &self,
        address_id: AddressId,
    ) -> Result<Vec<AddressTransaction>, StoreError> {
        self.inner.address_transactions(address_id)
    }

    fn count_addresses(&self, non_zero_only: bool) -> Result<u64, StoreError> {
        self.inner.count_addresses(non_zero_only)
    }

    fn nftoken_owner(&self, token: NFTokenId) -> Result<Option<AddressId>, StoreError> {
        self.inner.nftoken_owner(token)
    }

    fn set_nftoken_owner(&mut self, token: NFTokenId, owner: AddressId) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_nftoken_owner(token, owner)
    }

    fn issuance_record(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.inner.issuance_record()
    }

    fn set_issuance_record(&mut self, issuance: &[u8]) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_issuance_record(issuance)
    }

    fn issued_supply(&self) -> Result<u64, StoreError> {
        self.inner.issued_supply()
    }

    fn set_issued_supply(&mut self, issued: u64) -> Result<(), StoreError> {
        self.check()?;
        self.inner.set_issued_supply(issued)
    }

    fn savepoint(&mut self) -> Result<(), StoreError> {
        self.inner.savepoint()
    }

    fn release(&mut self) -> Result<(), StoreError> {
        self.inner.release()
    }

    fn rollback_to(&mut self) -> Result<(), StoreError> {
        self.inner.rollback_to()
    }

    fn savepoint_depth(&self) -> usize {
        self.inner.savepoint_depth()
    }
}
