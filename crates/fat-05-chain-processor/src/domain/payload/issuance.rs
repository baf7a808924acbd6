//! Token issuance: the first valid entry of every token chain.

use crate::domain::errors::PayloadError;
use fat_01_entry_authentication::{field_len, json_len, raw_len, DecodeError, ExpectedJsonLength};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Largest FAT-0 precision.
pub const MAX_PRECISION: u32 = 18;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    #[serde(rename = "FAT-0")]
    Fat0,
    #[serde(rename = "FAT-1")]
    Fat1,
}

impl TokenType {
    fn json_len(self) -> usize {
        // "FAT-0" / "FAT-1"
        7
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Issuance {
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Maximum coinbase total; -1 for unlimited.
    pub supply: i64,

    /// Display decimals, FAT-0 only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Box<RawValue>>,
}

impl Issuance {
    pub fn valid_data(&self) -> Result<(), PayloadError> {
        if self.supply == 0 || self.supply < -1 {
            return Err(PayloadError::InvalidSupply(self.supply));
        }
        if let Some(precision) = self.precision {
            if self.token_type == TokenType::Fat1 {
                return Err(PayloadError::PrecisionNotAllowed);
            }
            if precision > MAX_PRECISION {
                return Err(PayloadError::InvalidPrecision(precision));
            }
        }
        Ok(())
    }

    pub fn is_unlimited(&self) -> bool {
        self.supply == -1
    }

    /// Units still available to coinbase transactions; `None` when unlimited.
    pub fn remaining(&self, issued: u64) -> Option<u64> {
        if self.is_unlimited() {
            return None;
        }
        Some((self.supply as u64).saturating_sub(issued))
    }

    /// Fail if minting `amount` more would exceed the supply.
    pub fn check_supply(&self, issued: u64, amount: u64) -> Result<(), PayloadError> {
        match self.remaining(issued) {
            Some(remaining) if amount > remaining => Err(PayloadError::SupplyExceeded {
                requested: amount,
                remaining,
            }),
            _ => Ok(()),
        }
    }

    pub fn precision(&self) -> u32 {
        self.precision.unwrap_or(0)
    }
}

impl ExpectedJsonLength for Issuance {
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        let mut len = 2
            + field_len("type", self.token_type.json_len())
            + 1
            + field_len("supply", json_len(&self.supply)?);
        if let Some(precision) = &self.precision {
            len += 1 + field_len("precision", json_len(precision)?);
        }
        if let Some(symbol) = &self.symbol {
            len += 1 + field_len("symbol", json_len(symbol)?);
        }
        if let Some(metadata) = &self.metadata {
            len += 1 + field_len("metadata", raw_len(metadata));
        }
        Ok(len)
    }
}
