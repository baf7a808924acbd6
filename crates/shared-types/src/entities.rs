//! # Core Domain Entities
//!
//! Entities shared by all ledger subsystems.
//!
//! ## Clusters
//!
//! - **Identity**: `Rcd` (reveal-datum), `Address` (RCD hash)
//! - **Encoding**: base58check helpers for `FA...` / `Fs...` strings

use crate::errors::{AddressError, RcdError};
use crate::hashing::sha256d;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 32-byte value (chain id, entry hash, RCD hash).
pub type Bytes32 = [u8; 32];

// =============================================================================
// REVEAL-DATUM (RCD)
// =============================================================================

/// Size of an RCD type 1: type byte + Ed25519 public key.
pub const RCD_SIZE: usize = 33;

/// The only supported RCD type.
pub const RCD_TYPE_1: u8 = 0x01;

/// Ed25519 public key of the all-zero secret seed. Its address is the
/// coinbase address.
const ZERO_SEED_PUBLIC_KEY: [u8; 32] = [
    0x3b, 0x6a, 0x27, 0xbc, 0xce, 0xb6, 0xa4, 0x2d, 0x62, 0xa3, 0xa8, 0xd0, 0x2a, 0x6f, 0x0d, 0x73,
    0x65, 0x32, 0x15, 0x77, 0x1d, 0xe2, 0x43, 0xa6, 0x3a, 0xc0, 0x48, 0xa1, 0x8b, 0x59, 0xda, 0x29,
];

/// Reveal-datum: a typed commitment to a public key.
///
/// Format: `0x01 || public_key (32 bytes)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rcd([u8; RCD_SIZE]);

impl Rcd {
    /// Build an RCD type 1 from an Ed25519 public key.
    pub fn from_public_key(public_key: [u8; 32]) -> Self {
        let mut bytes = [0u8; RCD_SIZE];
        bytes[0] = RCD_TYPE_1;
        bytes[1..].copy_from_slice(&public_key);
        Self(bytes)
    }

    /// Parse an RCD from raw bytes, checking size and type.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RcdError> {
        if bytes.len() != RCD_SIZE {
            return Err(RcdError::InvalidSize {
                expected: RCD_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != RCD_TYPE_1 {
            return Err(RcdError::InvalidType(bytes[0]));
        }
        let mut rcd = [0u8; RCD_SIZE];
        rcd.copy_from_slice(bytes);
        Ok(Self(rcd))
    }

    /// The embedded Ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        let mut key = [0u8; 32];
        key.copy_from_slice(&self.0[1..]);
        key
    }

    /// Raw RCD bytes.
    pub fn as_bytes(&self) -> &[u8; RCD_SIZE] {
        &self.0
    }

    /// The address committed to by this RCD.
    pub fn address(&self) -> Address {
        Address(sha256d(&self.0))
    }
}

impl fmt::Debug for Rcd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rcd(")?;
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// ADDRESS
// =============================================================================

/// Two-byte prefix of a public Factoid address (`FA...`).
pub const FA_ADDRESS_PREFIX: [u8; 2] = [0x5f, 0xb1];

/// Two-byte prefix of a secret Factoid address (`Fs...`).
pub const FS_ADDRESS_PREFIX: [u8; 2] = [0x64, 0x78];

/// Ownership commitment of a balance: the RCD hash.
///
/// The canonical string form is the checksummed base58 `FA...` address.
/// Ordering is by raw hash bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub Bytes32);

impl Address {
    /// Wrap a raw RCD hash.
    pub const fn new(rcd_hash: Bytes32) -> Self {
        Self(rcd_hash)
    }

    /// The reserved sink/source address used for issuance and burns.
    pub fn coinbase() -> Self {
        Rcd::from_public_key(ZERO_SEED_PUBLIC_KEY).address()
    }

    /// Returns true for the coinbase address.
    pub fn is_coinbase(&self) -> bool {
        *self == Self::coinbase()
    }

    /// Raw RCD hash bytes.
    pub fn as_bytes(&self) -> &Bytes32 {
        &self.0
    }
}

impl From<&Rcd> for Address {
    fn from(rcd: &Rcd) -> Self {
        rcd.address()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_check(FA_ADDRESS_PREFIX, &self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_check(FA_ADDRESS_PREFIX, s).map(Self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// BASE58CHECK
// =============================================================================

/// Encode `prefix || payload || checksum` as base58, where the checksum is the
/// first four bytes of `sha256d(prefix || payload)`.
pub fn encode_check(prefix: [u8; 2], payload: &Bytes32) -> String {
    let mut buf = Vec::with_capacity(38);
    buf.extend_from_slice(&prefix);
    buf.extend_from_slice(payload);
    let checksum = sha256d(&buf);
    buf.extend_from_slice(&checksum[..4]);
    bs58::encode(buf).into_string()
}

/// Inverse of [`encode_check`]: verifies length, prefix and checksum.
pub fn decode_check(prefix: [u8; 2], s: &str) -> Result<Bytes32, AddressError> {
    let raw = bs58::decode(s)
        .into_vec()
        .map_err(|_| AddressError::InvalidEncoding)?;
    if raw.len() != 38 {
        return Err(AddressError::InvalidLength {
            expected: 38,
            actual: raw.len(),
        });
    }
    if raw[..2] != prefix {
        return Err(AddressError::InvalidPrefix([raw[0], raw[1]]));
    }
    let checksum = sha256d(&raw[..34]);
    if raw[34..] != checksum[..4] {
        return Err(AddressError::InvalidChecksum);
    }
    let mut payload = [0u8; 32];
    payload.copy_from_slice(&raw[2..34]);
    Ok(payload)
}
