//! # Address → NFTokens Map
//!
//! Ownership of token ids across addresses, with strict JSON parsing that
//! rejects duplicate ownership as soon as it is seen.

use crate::domain::errors::NFTokenError;
use crate::domain::tokens::{NFTokenId, NFTokens, MAX_CAPACITY};
use fat_01_entry_authentication::{canonical_len, DecodeError, ExpectedJsonLength};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::Address;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Length of `"FA...":` plus the separating comma.
const ADDRESS_JSON_LEN: usize = 52 + 4;

/// Token ids held by each address.
///
/// Emptied addresses are kept in memory but omitted from JSON.
#[derive(Clone, Debug, Default)]
pub struct AddressNFTokensMap {
    map: BTreeMap<Address, NFTokens>,
    /// Canonical length of the JSON this map was parsed from.
    source_len: Option<usize>,
}

impl PartialEq for AddressNFTokensMap {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl Eq for AddressNFTokensMap {}

impl AddressNFTokensMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, address: &Address) -> Option<&NFTokens> {
        self.map.get(address)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Address, NFTokens> {
        self.map.iter()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.map.keys()
    }

    /// Replace the tokens of `address`. Uniqueness is not checked here; see
    /// [`reverse_index`](Self::reverse_index).
    pub fn insert(&mut self, address: Address, tokens: NFTokens) -> Option<NFTokens> {
        self.source_len = None;
        self.map.insert(address, tokens)
    }

    /// Total number of ids across all addresses.
    pub fn num_token_ids(&self) -> usize {
        self.map.values().map(NFTokens::len).sum()
    }

    /// Address holding `id`, found by linear scan.
    pub fn owner(&self, id: NFTokenId) -> Option<Address> {
        self.map
            .iter()
            .find(|(_, tokens)| tokens.contains(id))
            .map(|(address, _)| *address)
    }

    /// Id → owner map, failing on the first id owned twice.
    pub fn reverse_index(&self) -> Result<BTreeMap<NFTokenId, Address>, NFTokenError> {
        let mut index = BTreeMap::new();
        for (address, tokens) in &self.map {
            for id in tokens.iter() {
                if let Some(first) = index.insert(id, *address) {
                    return Err(NFTokenError::Intersection {
                        id,
                        first,
                        second: *address,
                    });
                }
            }
        }
        Ok(index)
    }

    /// Fail if `tokens` shares an id with any address in the map.
    pub fn no_tokens_intersection(
        &self,
        address: &Address,
        tokens: &NFTokens,
    ) -> Result<(), NFTokenError> {
        for (existing, held) in &self.map {
            if let Err(NFTokenError::DuplicateId(id)) = held.no_intersection(tokens) {
                return Err(NFTokenError::Intersection {
                    id,
                    first: *existing,
                    second: *address,
                });
            }
        }
        Ok(())
    }

    /// Fail if any address with tokens appears in both maps.
    pub fn no_address_intersection(&self, other: &Self) -> Result<(), NFTokenError> {
        let (short, long) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        for (address, tokens) in &short.map {
            if tokens.is_empty() {
                continue;
            }
            if long.get(address).is_some_and(|t| !t.is_empty()) {
                return Err(NFTokenError::DuplicateAddress(*address));
            }
        }
        Ok(())
    }

    /// Succeeds iff both maps hold exactly the same ids.
    pub fn tokens_conserved(&self, other: &Self) -> Result<(), NFTokenError> {
        let left = self.num_token_ids();
        let right = other.num_token_ids();
        if left != right {
            return Err(NFTokenError::CountMismatch { left, right });
        }
        let all: NFTokens = self.map.values().flat_map(NFTokens::iter).collect();
        for id in other.map.values().flat_map(NFTokens::iter) {
            if !all.contains(id) {
                return Err(NFTokenError::MissingId(id));
            }
        }
        Ok(())
    }

    /// Canonical JSON form, keys in string order.
    ///
    /// Fails if no address holds tokens or if an id is owned twice.
    pub fn to_json(&self) -> Result<String, NFTokenError> {
        self.reverse_index()?;

        let mut entries: Vec<(String, &NFTokens)> = self
            .map
            .iter()
            .filter(|(_, tokens)| !tokens.is_empty())
            .map(|(address, tokens)| (address.to_string(), tokens))
            .collect();
        if entries.is_empty() {
            return Err(NFTokenError::Empty);
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::from("{");
        for (i, (key, tokens)) in entries.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push('"');
            out.push_str(&key);
            out.push_str("\":");
            out.push_str(&tokens.to_json());
        }
        out.push('}');
        Ok(out)
    }

    /// Parse the strict JSON form.
    ///
    /// Keys are processed in the order they appear. A repeated address, an id
    /// already owned by an earlier address, or a running total above
    /// [`MAX_CAPACITY`] fails immediately.
    pub fn from_json(bytes: &[u8]) -> Result<Self, NFTokenError> {
        let entries: OrderedEntries = serde_json::from_slice(bytes)?;
        if entries.0.is_empty() {
            return Err(NFTokenError::Empty);
        }

        let mut map = Self::new();
        let mut num_tokens = 0usize;
        // "{}" minus the comma counted after the last key
        let mut expected = 2 + entries.0.len() * ADDRESS_JSON_LEN - 1;

        for (key, raw) in entries.0 {
            let address: Address = key
                .parse()
                .map_err(|source| NFTokenError::InvalidAddress {
                    key: key.clone(),
                    source,
                })?;
            if map.map.contains_key(&address) {
                return Err(NFTokenError::DuplicateAddress(address));
            }

            let value = raw.get().as_bytes();
            let tokens = NFTokens::from_json(value)?;

            num_tokens += tokens.len();
            if num_tokens > MAX_CAPACITY {
                return Err(NFTokenError::CapacityExceeded {
                    limit: MAX_CAPACITY,
                });
            }
            map.no_tokens_intersection(&address, &tokens)?;

            expected += canonical_len(value);
            map.map.insert(address, tokens);
        }

        let actual = canonical_len(bytes);
        if expected != actual {
            return Err(DecodeError::LengthMismatch { expected, actual }.into());
        }
        map.source_len = Some(actual);
        Ok(map)
    }
}

impl FromIterator<(Address, NFTokens)> for AddressNFTokensMap {
    fn from_iter<I: IntoIterator<Item = (Address, NFTokens)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
            source_len: None,
        }
    }
}

impl<'a> IntoIterator for &'a AddressNFTokensMap {
    type Item = (&'a Address, &'a NFTokens);
    type IntoIter = btree_map::Iter<'a, Address, NFTokens>;

    fn into_iter(self) -> Self::IntoIter {
        self.map.iter()
    }
}

impl ExpectedJsonLength for AddressNFTokensMap {
    /// Length of the source JSON when parsed, else of the canonical form.
    fn expected_json_length(&self) -> Result<usize, DecodeError> {
        match self.source_len {
            Some(len) => Ok(len),
            None => self
                .to_json()
                .map(|json| json.len())
                .map_err(|e| DecodeError::Unencodable(e.to_string())),
        }
    }
}

impl Serialize for AddressNFTokensMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self
            .to_json()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        let raw =
            RawValue::from_string(json).map_err(<S::Error as serde::ser::Error>::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AddressNFTokensMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        AddressNFTokensMap::from_json(raw.get().as_bytes()).map_err(de::Error::custom)
    }
}

/// Object entries in the order they appear, duplicates included.
struct OrderedEntries(Vec<(String, Box<RawValue>)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of address to NFTokens")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((key, value)) = access.next_entry::<String, Box<RawValue>>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}
