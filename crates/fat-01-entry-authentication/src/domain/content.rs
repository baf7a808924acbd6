//! # Strict Content Decoding
//!
//! Token payloads are accepted only in a single, well-formed JSON object with
//! no unknown fields, no repeated keys, and no bytes the decoded value does
//! not account for. The last rule is enforced by comparing the canonical
//! (whitespace-free) length of the input with [`ExpectedJsonLength`].

use crate::domain::errors::DecodeError;
use serde::de::{self, DeserializeOwned, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::Serialize;
use serde_json::value::RawValue;
use shared_types::Entry;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

/// Implemented by payload types that can compute the length of their own
/// canonical JSON encoding.
pub trait ExpectedJsonLength {
    fn expected_json_length(&self) -> Result<usize, DecodeError>;
}

/// Decode the entry content as `T`.
pub fn decode_content<T>(entry: &Entry) -> Result<T, DecodeError>
where
    T: DeserializeOwned + ExpectedJsonLength,
{
    decode_json(&entry.content)
}

/// Decode `bytes` as `T` under the strict rules.
///
/// `T` must reject unknown fields itself (`#[serde(deny_unknown_fields)]`).
pub fn decode_json<T>(bytes: &[u8]) -> Result<T, DecodeError>
where
    T: DeserializeOwned + ExpectedJsonLength,
{
    let actual = scan_json(bytes)?;
    let value: T = serde_json::from_slice(bytes)?;
    let expected = value.expected_json_length()?;
    if expected != actual {
        return Err(DecodeError::LengthMismatch { expected, actual });
    }
    Ok(value)
}

/// Check that `bytes` hold exactly one JSON value with no repeated object
/// keys, and return its canonical length.
pub fn scan_json(bytes: &[u8]) -> Result<usize, DecodeError> {
    let duplicate = RefCell::new(None);
    let mut de = serde_json::Deserializer::from_slice(bytes);
    let scanned = KeyScan {
        duplicate: &duplicate,
    }
    .deserialize(&mut de)
    .and_then(|()| de.end());

    if let Err(e) = scanned {
        return Err(match duplicate.into_inner() {
            Some(key) => DecodeError::DuplicateKey(key),
            None => DecodeError::NotSingleJson(e.to_string()),
        });
    }
    Ok(canonical_len(bytes))
}

/// Length of `bytes` with all whitespace outside of strings removed.
///
/// Assumes valid JSON.
pub fn canonical_len(bytes: &[u8]) -> usize {
    let mut len = 0;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            len += 1;
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => {}
            b'"' => {
                in_string = true;
                len += 1;
            }
            _ => len += 1,
        }
    }
    len
}

/// Canonical length of a value as `serde_json` encodes it.
pub fn json_len<T: Serialize + ?Sized>(value: &T) -> Result<usize, DecodeError> {
    serde_json::to_vec(value)
        .map(|v| v.len())
        .map_err(|e| DecodeError::Unencodable(e.to_string()))
}

/// Canonical length of an embedded raw value.
pub fn raw_len(raw: &RawValue) -> usize {
    canonical_len(raw.get().as_bytes())
}

/// Canonical length of `"name":<value>`.
pub fn field_len(name: &str, value_len: usize) -> usize {
    name.len() + 3 + value_len
}

/// Walks any JSON value, failing on the first repeated key of an object.
struct KeyScan<'a> {
    duplicate: &'a RefCell<Option<String>>,
}

impl<'de, 'a> DeserializeSeed<'de> for KeyScan<'a> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for KeyScan<'a> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, _: bool) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_i64<E>(self, _: i64) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_u64<E>(self, _: u64) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_f64<E>(self, _: f64) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_str<E>(self, _: &str) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_unit<E>(self) -> Result<(), E>
    where
        E: de::Error,
    {
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while seq
            .next_element_seed(KeyScan {
                duplicate: self.duplicate,
            })?
            .is_some()
        {}
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            if !seen.insert(key.clone()) {
                let msg = format!("duplicate key {key:?}");
                *self.duplicate.borrow_mut() = Some(key);
                return Err(de::Error::custom(msg));
            }
            map.next_value_seed(KeyScan {
                duplicate: self.duplicate,
            })?;
        }
        Ok(())
    }
}
