//! Ledger records.

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Storage id of an address row.
pub type AddressId = u64;

/// Storage id of the entry that caused a balance change.
pub type EntryId = u64;

/// Identifier of one non-fungible token.
pub type NFTokenId = u64;

/// Id reserved for the coinbase address.
pub const COINBASE_ID: AddressId = 1;

/// One row of the `addresses` table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: AddressId,
    pub address: Address,
    pub balance: u64,
}

/// Whether an address received or sent value in a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Encoded as the `to` flag: true for incoming.
    pub fn is_incoming(self) -> bool {
        matches!(self, Self::Incoming)
    }

    pub fn from_flag(to: bool) -> Self {
        if to {
            Self::Incoming
        } else {
            Self::Outgoing
        }
    }
}

/// Append-only audit edge linking an address to an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressTransaction {
    pub id: u64,
    pub address_id: AddressId,
    pub entry_id: EntryId,
    pub direction: Direction,
}
