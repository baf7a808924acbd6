//! Address to amount maps used by FAT-0 inputs and outputs.

use crate::domain::errors::PayloadError;
use fat_01_entry_authentication::{field_len, json_len, DecodeError, ExpectedJsonLength};
use serde::de::{Deserializer, Error as _, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use shared_types::Address;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Non-zero amounts keyed by address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressAmountMap(BTreeMap<Address, u64>);

impl AddressAmountMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry; zero amounts and repeated addresses are rejected.
    pub fn insert(&mut self, address: Address, amount: u64) -> Result<(), PayloadError> {
        if amount == 0 {
            return Err(PayloadError::ZeroAmount(address));
        }
        if self.0.contains_key(&address) {
            return Err(PayloadError::DuplicateAddress(address));
        }
        self.0.insert(address, amount);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<u64> {
        self.0.get(address).copied()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.0.contains_key(address)
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Address, u64> {
        self.0.iter()
    }

    /// Checked total of all amounts.
    pub fn sum(&self) -> Result<u64, PayloadError> {
        self.0
            .values()
            .try_fold(0u64, |acc, &amount| acc.checked_add(amount))
            .ok_or(PayloadError::AmountOverflow)
    }

    /// True if the only address is the coinbase.
    pub fn is_coinbase(&self) -> bool {
        self.0.len() == 1 && self.0.contains_key(&Address::coinbase())
    }

    /// Fails with the first address present in both maps.
    pub fn no_address_intersection(&self, other: &Self) -> Result<(), PayloadError> {
        let (short, long) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        match short.addresses().find(|address| long.contains(address)) {
            Some(address) => Err(PayloadError::AddressInBoth(*address)),
            None => Ok(()),
        }
    }
}

impl<'a> IntoIterator for &'a AddressAmountMap {
    type Item = (&'a Address, &'a u64);
    type IntoIter = btree_map::Iter<'a, Address, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl ExpectedJsonLength for AddressAmountMap {
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        let separators = self.0.len().saturating_sub(1);
        let mut len = 2 + separators;
        for (address, amount) in &self.0 {
            len += field_len(&address.to_string(), json_len(amount)?);
        }
        Ok(len)
    }
}

impl Serialize for AddressAmountMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for AddressAmountMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountsVisitor;

        impl<'de> Visitor<'de> for AmountsVisitor {
            type Value = AddressAmountMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of address to amount")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = AddressAmountMap::new();
                while let Some((key, amount)) = access.next_entry::<String, u64>()? {
                    let address: Address = key.parse().map_err(|e| {
                        A::Error::custom(format_args!("invalid address {key:?}: {e}"))
                    })?;
                    map.insert(address, amount).map_err(A::Error::custom)?;
                }
                if map.is_empty() {
                    return Err(A::Error::custom(PayloadError::EmptyAmounts));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(AmountsVisitor)
    }
}
