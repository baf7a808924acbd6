//! FAT-1 transaction.

use crate::domain::errors::PayloadError;
use fat_01_entry_authentication::{field_len, raw_len, DecodeError, ExpectedJsonLength};
use fat_03_nftokens::AddressNFTokensMap;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::Address;

/// Non-fungible transfer. Per-token metadata is not supported.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fat1Transaction {
    pub inputs: AddressNFTokensMap,
    pub outputs: AddressNFTokensMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Box<RawValue>>,
}

impl Fat1Transaction {
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs.get(&Address::coinbase()).is_some()
    }

    /// Checks that do not depend on ledger state.
    pub fn valid_data(&self) -> Result<(), PayloadError> {
        if self.inputs.get(&Address::coinbase()).is_some() && self.inputs.len() > 1 {
            return Err(PayloadError::CoinbaseNotSoleInput);
        }
        self.inputs.no_address_intersection(&self.outputs)?;
        self.inputs.tokens_conserved(&self.outputs)?;
        Ok(())
    }
}

impl ExpectedJsonLength for Fat1Transaction {
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        let mut len = 2
            + field_len("inputs", self.inputs.expected_json_length()?)
            + 1
            + field_len("outputs", self.outputs.expected_json_length()?);
        if let Some(metadata) = &self.metadata {
            len += 1 + field_len("metadata", raw_len(metadata));
        }
        Ok(len)
    }
}
