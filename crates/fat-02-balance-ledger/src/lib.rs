//! # Balance Ledger Subsystem (FAT-02)
//!
//! Per-chain address balances with conservation and non-negativity
//! guarantees, an append-only audit trail, and nested checkpoints.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `BalanceLedger`, records, errors
//! - **Ports Layer** (`ports/`): `LedgerStore`, the storage abstraction
//! - **Adapters Layer** (`adapters/`): in-memory store (default) and a
//!   RocksDB store behind the `rocksdb` feature
//!
//! ## Invariants
//!
//! - Balances never go below zero; a rejected debit leaves the balance as is
//! - Address rows are created on first credit and never deleted
//! - Address id 1 is the coinbase address and is excluded from circulation
//! - Audit edges are append-only

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryLedgerStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbLedgerConfig, RocksDbLedgerStore};
pub use domain::entities::{
    AddressId, AddressRecord, AddressTransaction, Direction, EntryId, NFTokenId, COINBASE_ID,
};
pub use domain::errors::{LedgerError, StoreError};
pub use domain::ledger::{BalanceLedger, Checkpoint};
pub use ports::LedgerStore;
