//! # Entry
//!
//! The immutable record consumed from the underlying blockchain.

use crate::entities::Bytes32;
use crate::errors::EntryError;
use crate::hashing::{sha256, sha512};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// An entry as supplied by the blockchain client.
///
/// External ids carry the timestamp salt followed by the RCD/signature pairs
/// when the entry is an authenticated token record.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Chain the entry belongs to.
    #[serde_as(as = "Hex")]
    pub chain_id: Bytes32,
    /// Ordered external ids.
    #[serde_as(as = "Vec<Hex>")]
    pub ext_ids: Vec<Vec<u8>>,
    /// Content bytes (JSON for token records).
    #[serde_as(as = "Hex")]
    pub content: Vec<u8>,
    /// Entry hash.
    #[serde_as(as = "Hex")]
    pub hash: Bytes32,
    /// Declared entry timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Build an entry and compute its hash.
    pub fn new(
        chain_id: Bytes32,
        ext_ids: Vec<Vec<u8>>,
        content: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, EntryError> {
        let mut entry = Self {
            chain_id,
            ext_ids,
            content,
            hash: [0u8; 32],
            timestamp,
        };
        entry.hash = entry.compute_hash()?;
        Ok(entry)
    }

    /// Binary form: `0x00 || chain_id || u16be(ext_ids_size) ||
    /// {u16be(len) || ext_id}* || content`.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, EntryError> {
        let ext_ids_size: usize = self.ext_ids.iter().map(|id| 2 + id.len()).sum();
        let size_prefix =
            u16::try_from(ext_ids_size).map_err(|_| EntryError::ExtIdsTooLarge(ext_ids_size))?;

        let mut data = Vec::with_capacity(1 + 32 + 2 + ext_ids_size + self.content.len());
        data.push(0x00);
        data.extend_from_slice(&self.chain_id);
        data.extend_from_slice(&size_prefix.to_be_bytes());
        for id in &self.ext_ids {
            let len = u16::try_from(id.len()).map_err(|_| EntryError::ExtIdsTooLarge(ext_ids_size))?;
            data.extend_from_slice(&len.to_be_bytes());
            data.extend_from_slice(id);
        }
        data.extend_from_slice(&self.content);
        Ok(data)
    }

    /// `sha256(sha512(data) || data)` over the binary form.
    pub fn compute_hash(&self) -> Result<Bytes32, EntryError> {
        let data = self.marshal_binary()?;
        let mut buf = Vec::with_capacity(64 + data.len());
        buf.extend_from_slice(&sha512(&data));
        buf.extend_from_slice(&data);
        Ok(sha256(&buf))
    }

    /// Returns true if the stored hash matches the content.
    ///
    /// An entry without a binary form has no valid hash.
    pub fn hash_is_valid(&self) -> bool {
        matches!(self.compute_hash(), Ok(hash) if hash == self.hash)
    }
}
