//! # Shared Types Crate
//!
//! Domain entities shared by every ledger subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address`, `Rcd` and `Entry` are defined once
//!   here and reused by authentication, ledger, NFToken and contract crates.
//! - **Canonical Strings**: an `Address` only ever leaves the process in its
//!   checksummed `FA...` form, so JSON keys have one spelling.
//! - **Two Error Tiers**: every subsystem error reports an [`ErrorTier`] so the
//!   chain processor can tell a rejected entry from a halted chain.

pub mod entities;
pub mod entry;
pub mod errors;
pub mod hashing;

pub use entities::*;
pub use entry::Entry;
pub use errors::*;
pub use hashing::{sha256, sha256d, sha512};
