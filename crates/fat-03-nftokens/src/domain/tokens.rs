//! # NFToken Sets
//!
//! JSON form is an array of ids and `{"min":a,"max":b}` ranges. Encoding
//! emits ids ascending and uses a range wherever it is shorter than listing
//! the run.

use crate::domain::errors::NFTokenError;
use fat_01_entry_authentication::{canonical_len, DecodeError};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::collections::BTreeSet;

/// Identifier of one non-fungible token.
pub type NFTokenId = u64;

/// Ceiling on the ids any single set or map may hold.
pub const MAX_CAPACITY: usize = 400_000;

/// `{"min":,"max":}`
const RANGE_JSON_OVERHEAD: usize = 15;

/// A set of token ids, iterated in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NFTokens(BTreeSet<NFTokenId>);

#[derive(Deserialize)]
#[serde(untagged)]
enum Element {
    Id(NFTokenId),
    Range(Range),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Range {
    min: NFTokenId,
    max: NFTokenId,
}

impl NFTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: NFTokenId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = NFTokenId> + '_ {
        self.0.iter().copied()
    }

    /// Add one id; fails on a duplicate or when full.
    pub fn insert(&mut self, id: NFTokenId) -> Result<(), NFTokenError> {
        if self.0.contains(&id) {
            return Err(NFTokenError::DuplicateId(id));
        }
        if self.0.len() >= MAX_CAPACITY {
            return Err(NFTokenError::CapacityExceeded {
                limit: MAX_CAPACITY,
            });
        }
        self.0.insert(id);
        Ok(())
    }

    /// Add every id in `min..=max`.
    pub fn insert_range(&mut self, min: NFTokenId, max: NFTokenId) -> Result<(), NFTokenError> {
        if min > max {
            return Err(NFTokenError::InvalidRange { min, max });
        }
        let count = u128::from(max - min) + 1;
        if count > (MAX_CAPACITY - self.0.len()) as u128 {
            return Err(NFTokenError::CapacityExceeded {
                limit: MAX_CAPACITY,
            });
        }
        for id in min..=max {
            self.insert(id)?;
        }
        Ok(())
    }

    /// Fails with the first id present in both sets.
    pub fn no_intersection(&self, other: &NFTokens) -> Result<(), NFTokenError> {
        let (short, long) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        match short.iter().find(|id| long.contains(*id)) {
            Some(id) => Err(NFTokenError::DuplicateId(id)),
            None => Ok(()),
        }
    }

    /// Parse the strict JSON form.
    ///
    /// Rejects an empty list, duplicate or overlapping ids, more than
    /// [`MAX_CAPACITY`] ids, and any bytes beyond what the elements account
    /// for.
    pub fn from_json(bytes: &[u8]) -> Result<Self, NFTokenError> {
        let elements: Vec<Element> = serde_json::from_slice(bytes)?;
        if elements.is_empty() {
            return Err(NFTokenError::Empty);
        }

        let mut tokens = NFTokens::new();
        // "[]" plus the commas between elements
        let mut expected = 2 + elements.len() - 1;
        for element in elements {
            match element {
                Element::Id(id) => {
                    tokens.insert(id)?;
                    expected += digit_len(id);
                }
                Element::Range(Range { min, max }) => {
                    tokens.insert_range(min, max)?;
                    expected += range_json_len(min, max);
                }
            }
        }

        let actual = canonical_len(bytes);
        if expected != actual {
            return Err(DecodeError::LengthMismatch { expected, actual }.into());
        }
        Ok(tokens)
    }

    /// Canonical JSON form.
    pub fn to_json(&self) -> String {
        let mut out = String::with_capacity(self.json_len());
        out.push('[');
        for (i, (min, max)) in self.runs().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if use_range(min, max) {
                out.push_str(&format!(r#"{{"min":{min},"max":{max}}}"#));
            } else {
                for id in min..=max {
                    if id > min {
                        out.push(',');
                    }
                    out.push_str(&id.to_string());
                }
            }
        }
        out.push(']');
        out
    }

    /// Length of [`to_json`](Self::to_json).
    pub fn json_len(&self) -> usize {
        let runs: Vec<_> = self.runs().collect();
        let separators = runs.len().saturating_sub(1);
        2 + separators
            + runs
                .into_iter()
                .map(|(min, max)| {
                    if use_range(min, max) {
                        range_json_len(min, max)
                    } else {
                        ids_json_len(min, max)
                    }
                })
                .sum::<usize>()
    }

    /// Maximal contiguous runs `(min, max)`, ascending.
    fn runs(&self) -> impl Iterator<Item = (NFTokenId, NFTokenId)> + '_ {
        let mut ids = self.0.iter().copied().peekable();
        std::iter::from_fn(move || {
            let min = ids.next()?;
            let mut max = min;
            while let Some(&next) = ids.peek() {
                if Some(next) != max.checked_add(1) {
                    break;
                }
                max = next;
                ids.next();
            }
            Some((min, max))
        })
    }
}

impl FromIterator<NFTokenId> for NFTokens {
    /// Collects ids, silently merging duplicates.
    fn from_iter<I: IntoIterator<Item = NFTokenId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NFTokens {
    type Item = &'a NFTokenId;
    type IntoIter = std::collections::btree_set::Iter<'a, NFTokenId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for NFTokens {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = RawValue::from_string(self.to_json())
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NFTokens {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        NFTokens::from_json(raw.get().as_bytes()).map_err(de::Error::custom)
    }
}

pub(crate) fn digit_len(id: NFTokenId) -> usize {
    id.checked_ilog10().map_or(1, |d| d as usize + 1)
}

fn range_json_len(min: NFTokenId, max: NFTokenId) -> usize {
    RANGE_JSON_OVERHEAD + digit_len(min) + digit_len(max)
}

fn ids_json_len(min: NFTokenId, max: NFTokenId) -> usize {
    let digits: usize = (min..=max).map(digit_len).sum();
    digits + (max - min) as usize
}

fn use_range(min: NFTokenId, max: NFTokenId) -> bool {
    range_json_len(min, max) < ids_json_len(min, max)
}
