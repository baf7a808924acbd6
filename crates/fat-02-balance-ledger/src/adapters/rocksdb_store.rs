//! # RocksDB Ledger Store
//!
//! Persistent `LedgerStore` for one chain.
//!
//! ## Key Layout
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `a` | rcd hash (32) | address id (u64 BE) |
//! | `i` | address id (u64 BE) | rcd hash (32) + balance (u64 BE) |
//! | `t` | address id + tx id (u64 BE) | entry id (u64 BE) + `to` flag (1) |
//! | `n` | token id (u64 BE) | owner address id (u64 BE) |
//! | `m` | counter name | u64 BE |
//! | `m` | `issuance` | issuance JSON |
//!
//! ## Savepoints
//!
//! Writes go to an in-memory overlay. Each savepoint snapshots the overlay;
//! when the outermost savepoint is released (or when no savepoint is open)
//! the overlay is flushed as one atomic `WriteBatch`.

use crate::domain::entities::{
    AddressId, AddressRecord, AddressTransaction, Direction, EntryId, NFTokenId, COINBASE_ID,
};
use crate::domain::errors::StoreError;
use crate::ports::LedgerStore;
use rocksdb::{Direction as ScanDirection, IteratorMode, Options, WriteBatch, WriteOptions, DB};
use shared_types::Address;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, error};

const PREFIX_ADDRESS: u8 = b'a';
const PREFIX_ID: u8 = b'i';
const PREFIX_TX: u8 = b't';
const PREFIX_NFTOKEN: u8 = b'n';

const META_NEXT_ADDRESS_ID: &[u8] = b"mnext_address_id";
const META_NEXT_TX_ID: &[u8] = b"mnext_tx_id";
const META_NON_ZERO_COUNT: &[u8] = b"mnon_zero_count";
const META_ISSUED: &[u8] = b"missued";
const META_ISSUANCE: &[u8] = b"missuance";

/// RocksDB configuration for a chain database.
#[derive(Debug, Clone)]
pub struct RocksDbLedgerConfig {
    /// Path to the database directory
    pub path: PathBuf,
    /// fsync every flushed batch (default: true for durability)
    pub sync_writes: bool,
    /// Write buffer size in bytes (default: 16MB)
    pub write_buffer_size: usize,
}

impl Default for RocksDbLedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/fatd"),
            sync_writes: true,
            write_buffer_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl RocksDbLedgerConfig {
    /// Create config for testing (small buffers, no sync)
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
            write_buffer_size: 1024 * 1024, // 1MB
        }
    }
}

/// RocksDB-backed `LedgerStore`.
pub struct RocksDbLedgerStore {
    db: DB,
    config: RocksDbLedgerConfig,
    overlay: BTreeMap<Vec<u8>, Vec<u8>>,
    savepoints: Vec<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl RocksDbLedgerStore {
    /// Open or create the database.
    pub fn open(config: RocksDbLedgerConfig) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let db = DB::open(&opts, &config.path)
            .map_err(|e| StoreError::Unavailable(format!("Failed to open RocksDB: {e}")))?;

        debug!(path = %config.path.display(), "Opened ledger database");
        Ok(Self {
            db,
            config,
            overlay: BTreeMap::new(),
            savepoints: Vec::new(),
        })
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(value) = self.overlay.get(key) {
            return Ok(Some(value.clone()));
        }
        self.db
            .get(key)
            .map_err(|e| StoreError::Unavailable(format!("RocksDB get failed: {e}")))
    }

    fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.overlay.insert(key, value);
    }

    fn get_u64(&self, key: &[u8]) -> Result<Option<u64>, StoreError> {
        self.get(key)?.map(|v| decode_u64(&v)).transpose()
    }

    fn counter(&self, key: &[u8]) -> Result<u64, StoreError> {
        Ok(self.get_u64(key)?.unwrap_or(0))
    }

    fn set_counter(&mut self, key: &[u8], value: u64) {
        self.put(key.to_vec(), value.to_be_bytes().to_vec());
    }

    fn record(&self, id: AddressId) -> Result<Option<AddressRecord>, StoreError> {
        let Some(value) = self.get(&id_key(id))? else {
            return Ok(None);
        };
        if value.len() != 40 {
            return Err(StoreError::Corrupt(format!("address row {id}")));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&value[..32]);
        Ok(Some(AddressRecord {
            id,
            address: Address::new(hash),
            balance: decode_u64(&value[32..])?,
        }))
    }

    fn put_record(&mut self, record: &AddressRecord) {
        let mut value = Vec::with_capacity(40);
        value.extend_from_slice(record.address.as_bytes());
        value.extend_from_slice(&record.balance.to_be_bytes());
        self.put(id_key(record.id), value);
    }

    /// Track the non-zero counter across a balance change.
    fn adjust_non_zero(&mut self, id: AddressId, before: u64, after: u64) -> Result<(), StoreError> {
        if id == COINBASE_ID || (before == 0) == (after == 0) {
            return Ok(());
        }
        let count = self.counter(META_NON_ZERO_COUNT)?;
        let count = if after == 0 {
            count.saturating_sub(1)
        } else {
            count + 1
        };
        self.set_counter(META_NON_ZERO_COUNT, count);
        Ok(())
    }

    /// Flush the overlay when no savepoint is open.
    fn flush_if_idle(&mut self) -> Result<(), StoreError> {
        if !self.savepoints.is_empty() || self.overlay.is_empty() {
            return Ok(());
        }

        let mut batch = WriteBatch::default();
        for (key, value) in &self.overlay {
            batch.put(key, value);
        }

        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);

        self.db.write_opt(batch, &write_opts).map_err(|e| {
            error!(error = %e, "RocksDB batch write failed");
            StoreError::Unavailable(format!("RocksDB batch write failed: {e}"))
        })?;
        self.overlay.clear();
        Ok(())
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<BTreeMap<Vec<u8>, Vec<u8>>, StoreError> {
        let mut results = BTreeMap::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix, ScanDirection::Forward));
        for item in iter {
            let (key, value) =
                item.map_err(|e| StoreError::Unavailable(format!("RocksDB scan failed: {e}")))?;
            if !key.starts_with(prefix) {
                break;
            }
            results.insert(key.to_vec(), value.to_vec());
        }
        for (key, value) in self.overlay.range(prefix.to_vec()..) {
            if !key.starts_with(prefix) {
                break;
            }
            results.insert(key.clone(), value.clone());
        }
        Ok(results)
    }
}

impl LedgerStore for RocksDbLedgerStore {
    fn select_address(&self, address: &Address) -> Result<Option<AddressRecord>, StoreError> {
        match self.get_u64(&address_key(address))? {
            Some(id) => self.record(id),
            None => Ok(None),
        }
    }

    fn upsert_add_balance(
        &mut self,
        address: &Address,
        add: u64,
    ) -> Result<AddressId, StoreError> {
        let record = match self.select_address(address)? {
            Some(mut record) => {
                let before = record.balance;
                record.balance = before.checked_add(add).ok_or(StoreError::Overflow)?;
                self.adjust_non_zero(record.id, before, record.balance)?;
                record
            }
            None => {
                let id = self.counter(META_NEXT_ADDRESS_ID)?.max(1);
                self.set_counter(META_NEXT_ADDRESS_ID, id + 1);
                self.put(address_key(address), id.to_be_bytes().to_vec());
                self.adjust_non_zero(id, 0, add)?;
                AddressRecord {
                    id,
                    address: *address,
                    balance: add,
                }
            }
        };
        self.put_record(&record);
        self.flush_if_idle()?;
        Ok(record.id)
    }

    fn subtract_balance(&mut self, id: AddressId, sub: u64) -> Result<usize, StoreError> {
        let Some(mut record) = self.record(id)? else {
            return Ok(0);
        };
        let before = record.balance;
        record.balance = before.checked_sub(sub).ok_or(StoreError::ConstraintCheck)?;
        self.adjust_non_zero(id, before, record.balance)?;
        self.put_record(&record);
        self.flush_if_idle()?;
        Ok(1)
    }

    fn insert_address_transaction(
        &mut self,
        address_id: AddressId,
        entry_id: EntryId,
        direction: Direction,
    ) -> Result<u64, StoreError> {
        let id = self.counter(META_NEXT_TX_ID)?.max(1);
        self.set_counter(META_NEXT_TX_ID, id + 1);

        let mut key = vec![PREFIX_TX];
        key.extend_from_slice(&address_id.to_be_bytes());
        key.extend_from_slice(&id.to_be_bytes());
        let mut value = entry_id.to_be_bytes().to_vec();
        value.push(u8::from(direction.is_incoming()));
        self.put(key, value);

        self.flush_if_idle()?;
        Ok(id)
    }

    fn address_transactions(
        &self,
        address_id: AddressId,
    ) -> Result<Vec<AddressTransaction>, StoreError> {
        let mut prefix = vec![PREFIX_TX];
        prefix.extend_from_slice(&address_id.to_be_bytes());

        self.scan_prefix(&prefix)?
            .into_iter()
            .map(|(key, value)| {
                if key.len() != 17 || value.len() != 9 {
                    return Err(StoreError::Corrupt("address transaction".into()));
                }
                Ok(AddressTransaction {
                    id: decode_u64(&key[9..])?,
                    address_id,
                    entry_id: decode_u64(&value[..8])?,
                    direction: Direction::from_flag(value[8] != 0),
                })
            })
            .collect()
    }

    fn count_addresses(&self, non_zero_only: bool) -> Result<u64, StoreError> {
        if non_zero_only {
            return self.counter(META_NON_ZERO_COUNT);
        }
        // Ids are dense from 1; the coinbase row is id 1.
        Ok(self.counter(META_NEXT_ADDRESS_ID)?.saturating_sub(2))
    }

    fn nftoken_owner(&self, token: NFTokenId) -> Result<Option<AddressId>, StoreError> {
        self.get_u64(&nftoken_key(token))
    }

    fn set_nftoken_owner(
        &mut self,
        token: NFTokenId,
        owner: AddressId,
    ) -> Result<(), StoreError> {
        self.put(nftoken_key(token), owner.to_be_bytes().to_vec());
        self.flush_if_idle()
    }

    fn issuance_record(&self) -> Result<Option<Vec<u8>>, StoreError> {
        self.get(META_ISSUANCE)
    }

    fn set_issuance_record(&mut self, issuance: &[u8]) -> Result<(), StoreError> {
        self.put(META_ISSUANCE.to_vec(), issuance.to_vec());
        self.flush_if_idle()
    }

    fn issued_supply(&self) -> Result<u64, StoreError> {
        self.counter(META_ISSUED)
    }

    fn set_issued_supply(&mut self, issued: u64) -> Result<(), StoreError> {
        self.set_counter(META_ISSUED, issued);
        self.flush_if_idle()
    }

    fn savepoint(&mut self) -> Result<(), StoreError> {
        self.savepoints.push(self.overlay.clone());
        Ok(())
    }

    fn release(&mut self) -> Result<(), StoreError> {
        self.savepoints.pop().ok_or(StoreError::NoSavepoint)?;
        self.flush_if_idle()
    }

    fn rollback_to(&mut self) -> Result<(), StoreError> {
        self.overlay = self.savepoints.pop().ok_or(StoreError::NoSavepoint)?;
        self.flush_if_idle()
    }

    fn savepoint_depth(&self) -> usize {
        self.savepoints.len()
    }
}

fn address_key(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(33);
    key.push(PREFIX_ADDRESS);
    key.extend_from_slice(address.as_bytes());
    key
}

fn id_key(id: AddressId) -> Vec<u8> {
    let mut key = vec![PREFIX_ID];
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn nftoken_key(token: NFTokenId) -> Vec<u8> {
    let mut key = vec![PREFIX_NFTOKEN];
    key.extend_from_slice(&token.to_be_bytes());
    key
}

fn decode_u64(bytes: &[u8]) -> Result<u64, StoreError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::Corrupt(format!("expected 8 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(array))
}
