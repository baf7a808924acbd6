//! FAT-0 transaction.

use crate::domain::errors::PayloadError;
use crate::domain::payload::amounts::AddressAmountMap;
use fat_01_entry_authentication::{field_len, json_len, raw_len, DecodeError, ExpectedJsonLength};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::Address;

/// Fungible transfer, optionally calling the contract it pays.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fat0Transaction {
    pub inputs: AddressAmountMap,
    pub outputs: AddressAmountMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract: Option<ContractCall>,
}

/// Contract entry point invoked after the transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractCall {
    pub func: String,
    pub args: Vec<i64>,
}

impl Fat0Transaction {
    /// Coinbase transactions mint from the issuer's supply.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_coinbase()
    }

    /// The contract address of a contract call: its single output.
    pub fn contract_address(&self) -> Option<Address> {
        self.contract.as_ref()?;
        self.outputs.addresses().next().copied()
    }

    /// Checks that do not depend on ledger state.
    pub fn valid_data(&self) -> Result<(), PayloadError> {
        let inputs = self.inputs.sum()?;
        let outputs = self.outputs.sum()?;
        if inputs != outputs {
            return Err(PayloadError::SumMismatch { inputs, outputs });
        }
        if self.inputs.contains(&Address::coinbase()) && self.inputs.len() > 1 {
            return Err(PayloadError::CoinbaseNotSoleInput);
        }
        self.inputs.no_address_intersection(&self.outputs)?;

        if self.contract.is_some() {
            if self.is_coinbase() {
                return Err(PayloadError::InvalidContractCall(
                    "coinbase transactions cannot call contracts",
                ));
            }
            if self.inputs.len() != 1 || self.outputs.len() != 1 {
                return Err(PayloadError::InvalidContractCall(
                    "a contract call needs exactly one input and one output",
                ));
            }
        }
        Ok(())
    }
}

impl ExpectedJsonLength for ContractCall {
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        Ok(2 + field_len("func", json_len(&self.func)?)
            + 1
            + field_len("args", json_len(&self.args)?))
    }
}

impl ExpectedJsonLength for Fat0Transaction {
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        let mut len = 2
            + field_len("inputs", self.inputs.expected_json_length()?)
            + 1
            + field_len("outputs", self.outputs.expected_json_length()?);
        if let Some(metadata) = &self.metadata {
            len += 1 + field_len("metadata", raw_len(metadata));
        }
        if let Some(contract) = &self.contract {
            len += 1 + field_len("contract", contract.expected_json_length()?);
        }
        Ok(len)
    }
}
