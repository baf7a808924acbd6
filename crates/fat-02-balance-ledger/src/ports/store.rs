use crate::domain::entities::{
    AddressId, AddressRecord, AddressTransaction, Direction, EntryId, NFTokenId,
};
use crate::domain::errors::StoreError;
use shared_types::Address;

/// Storage abstraction for one chain's ledger tables.
///
/// A store has a single owner; `&mut self` serializes writers.
///
/// Savepoints nest: every `savepoint` is closed by exactly one `release`
/// (keep writes) or `rollback_to` (discard writes since the savepoint).
pub trait LedgerStore: Send {
    fn select_address(&self, address: &Address) -> Result<Option<AddressRecord>, StoreError>;

    /// Insert the address with balance `add`, or add `add` to its balance.
    ///
    /// Returns the row id. Fails with [`StoreError::Overflow`] and changes
    /// nothing if the sum overflows.
    fn upsert_add_balance(&mut self, address: &Address, add: u64)
        -> Result<AddressId, StoreError>;

    /// Subtract `sub` from the balance of row `id`.
    ///
    /// Returns the number of rows changed. Fails with
    /// [`StoreError::ConstraintCheck`] and changes nothing if the balance
    /// would go negative.
    fn subtract_balance(&mut self, id: AddressId, sub: u64) -> Result<usize, StoreError>;

    fn insert_address_transaction(
        &mut self,
        address_id: AddressId,
        entry_id: EntryId,
        direction: Direction,
    ) -> Result<u64, StoreError>;

    /// Audit edges of one address, oldest first.
    fn address_transactions(
        &self,
        address_id: AddressId,
    ) -> Result<Vec<AddressTransaction>, StoreError>;

    /// Number of addresses other than the coinbase row, optionally only those
    /// with a non-zero balance.
    fn count_addresses(&self, non_zero_only: bool) -> Result<u64, StoreError>;

    fn nftoken_owner(&self, token: NFTokenId) -> Result<Option<AddressId>, StoreError>;

    fn set_nftoken_owner(&mut self, token: NFTokenId, owner: AddressId)
        -> Result<(), StoreError>;

    /// Serialized issuance of the chain, once issued.
    fn issuance_record(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn set_issuance_record(&mut self, issuance: &[u8]) -> Result<(), StoreError>;

    /// Total minted by coinbase transactions.
    fn issued_supply(&self) -> Result<u64, StoreError>;

    fn set_issued_supply(&mut self, issued: u64) -> Result<(), StoreError>;

    fn savepoint(&mut self) -> Result<(), StoreError>;

    fn release(&mut self) -> Result<(), StoreError>;

    fn rollback_to(&mut self) -> Result<(), StoreError>;

    /// Number of open savepoints.
    fn savepoint_depth(&self) -> usize;
}
