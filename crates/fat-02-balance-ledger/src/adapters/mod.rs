//! Storage adapters.

pub mod memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

pub use memory::InMemoryLedgerStore;
#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbLedgerConfig, RocksDbLedgerStore};
