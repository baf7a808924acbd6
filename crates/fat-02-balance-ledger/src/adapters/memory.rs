use crate::domain::entities::{
    AddressId, AddressRecord, AddressTransaction, Direction, EntryId, NFTokenId, COINBASE_ID,
};
use crate::domain::errors::StoreError;
use crate::ports::LedgerStore;
use shared_types::Address;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default)]
struct Tables {
    /// Row `id` lives at index `id - 1`.
    addresses: Vec<AddressRecord>,
    by_address: HashMap<Address, AddressId>,
    transactions: Vec<AddressTransaction>,
    nf_tokens: BTreeMap<NFTokenId, AddressId>,
    issuance: Option<Vec<u8>>,
    issued: u64,
}

/// In-memory implementation of `LedgerStore`.
///
/// Each savepoint keeps a full snapshot of the tables.
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedgerStore {
    tables: Tables,
    savepoints: Vec<Tables>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, id: AddressId) -> Option<&mut AddressRecord> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.tables.addresses.get_mut(index)
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn select_address(&self, address: &Address) -> Result<Option<AddressRecord>, StoreError> {
        Ok(self
            .tables
            .by_address
            .get(address)
            .and_then(|&id| self.tables.addresses.get((id - 1) as usize))
            .copied())
    }

    fn upsert_add_balance(
        &mut self,
        address: &Address,
        add: u64,
    ) -> Result<AddressId, StoreError> {
        if let Some(&id) = self.tables.by_address.get(address) {
            let record = self
                .record_mut(id)
                .ok_or_else(|| StoreError::Corrupt(format!("dangling address id {id}")))?;
            record.balance = record
                .balance
                .checked_add(add)
                .ok_or(StoreError::Overflow)?;
            return Ok(id);
        }

        let id = self.tables.addresses.len() as AddressId + 1;
        self.tables.addresses.push(AddressRecord {
            id,
            address: *address,
            balance: add,
        });
        self.tables.by_address.insert(*address, id);
        Ok(id)
    }

    fn subtract_balance(&mut self, id: AddressId, sub: u64) -> Result<usize, StoreError> {
        let Some(record) = self.record_mut(id) else {
            return Ok(0);
        };
        record.balance = record
            .balance
            .checked_sub(sub)
            .ok_or(StoreError::ConstraintCheck)?;
        Ok(1)
    }

    fn insert_address_transaction(
        &mut self,
        address_id: AddressId,
        entry_id: EntryId,
        direction: Direction,
    ) -> Result<u64, StoreError> {
        let id = self.tables.transactions.len() as u64 + 1;
        self.tables.transactions.push(AddressTransaction {
            id,
            address_id,
            entry_id,
            direction,
        });
        Ok(id)
    }

    fn address_transactions(
        &self,
        address_id: AddressId,
    ) -> Result<Vec<AddressTransaction>, StoreError> {
        Ok(self
            .tables
            .transactions
            .iter()
            .filter(|tx| tx.address_id == address_id)
            .copied()
            .collect())
    }

    fn count_addresses(&self, non_zero_only: bool) -> Result<u64, StoreError> {
        Ok(self
            .tables
            .addresses
            .iter()
            .filter(|r| r.id != COINBASE_ID && (!non_zero_only || r.balance > 0))
            .count() as u64)
    }

    fn nftoken_owner(&self, token: NFTokenId) -> Result<Option<AddressId>, StoreError> {
        Ok(self.tables.nf_tokens.get(&token).copied())
    }

    fn set_nftoken_owner(
        &mut self,
        token: NFTokenId,
        owner: AddressId,
    ) -> Result<(), StoreError> {
        self.tables.nf_tokens.insert(token, owner);
        Ok(())
    }

    fn issuance_record(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.tables.issuance.clone())
    }

    fn set_issuance_record(&mut self, issuance: &[u8]) -> Result<(), StoreError> {
        self.tables.issuance = Some(issuance.to_vec());
        Ok(())
    }

    fn issued_supply(&self) -> Result<u64, StoreError> {
        Ok(self.tables.issued)
    }

    fn set_issued_supply(&mut self, issued: u64) -> Result<(), StoreError> {
        self.tables.issued = issued;
        Ok(())
    }

    fn savepoint(&mut self) -> Result<(), StoreError> {
        self.savepoints.push(self.tables.clone());
        Ok(())
    }

    fn release(&mut self) -> Result<(), StoreError> {
        self.savepoints.pop().ok_or(StoreError::NoSavepoint)?;
        Ok(())
    }

    fn rollback_to(&mut self) -> Result<(), StoreError> {
        self.tables = self.savepoints.pop().ok_or(StoreError::NoSavepoint)?;
        Ok(())
    }

    fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }
}
