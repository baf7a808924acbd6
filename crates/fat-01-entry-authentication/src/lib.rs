//! # Entry Authentication Subsystem (FAT-01)
//!
//! Authenticates signed token-chain entries.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): external-id layout checks, signature
//!   verification and signing, strict content decoding, signing keys
//! - **Service Layer** (`service.rs`): `EntryAuthenticator`, the single
//!   routine every payload type goes through
//!
//! ## External-id Layout
//!
//! ```text
//! [ timestamp_salt, rcd_0, sig_0, rcd_1, sig_1, ... ]
//! ```
//!
//! Pair `i` signs `sha512(index_salt(i) || timestamp_salt || chain_id || content)`.
//!
//! ## Security Notes
//!
//! - **Anti-replay**: the timestamp salt must lie within 12 hours of the entry
//!   timestamp
//! - **Canonical signatures**: verification uses `verify_strict`
//! - **Strict JSON**: unknown fields, duplicate keys and non-canonical extra
//!   bytes are all rejected

pub mod domain;
pub mod service;

// Re-export public API
pub use domain::content::{
    canonical_len, decode_content, decode_json, field_len, json_len, raw_len, scan_json,
    ExpectedJsonLength,
};
pub use domain::errors::{AuthError, DecodeError};
pub use domain::ext_ids::{
    signer_rcds, validate_ext_ids, validate_signatures, validate_structure, validate_timestamp,
    verify_signature_pairs, PairVerification, SignatureReport, SIGNATURE_SIZE,
    TIMESTAMP_SALT_WINDOW_SECS,
};
pub use domain::keys::Signer;
pub use domain::signing::{sign_entry, sign_entry_with_salt};
pub use service::{AuthenticatedEntry, EntryAuthenticator};
