//! # Entry Authenticator
//!
//! The single authentication routine shared by every payload type: validate
//! the external ids, then hand back the signer set for the payload-specific
//! checks.

use crate::domain::content::{decode_content, ExpectedJsonLength};
use crate::domain::errors::{AuthError, DecodeError};
use crate::domain::ext_ids::{signer_rcds, validate_ext_ids};
use serde::de::DeserializeOwned;
use shared_types::{Address, Entry, Rcd};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// An entry whose external ids passed validation.
#[derive(Debug)]
pub struct AuthenticatedEntry<'a> {
    pub entry: &'a Entry,
    /// RCDs of the signing pairs, in pair order.
    pub signers: Vec<Rcd>,
}

impl AuthenticatedEntry<'_> {
    /// Addresses committed to by the signing RCDs.
    pub fn signer_addresses(&self) -> BTreeSet<Address> {
        self.signers.iter().map(Rcd::address).collect()
    }

    /// Strictly decode the content as `T`.
    pub fn decode<T>(&self) -> Result<T, DecodeError>
    where
        T: DeserializeOwned + ExpectedJsonLength,
    {
        decode_content(self.entry)
    }
}

/// Authenticates entries of one token chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntryAuthenticator;

impl EntryAuthenticator {
    pub fn new() -> Self {
        Self
    }

    /// Run structure, timestamp and signature validation.
    pub fn authenticate<'a>(&self, entry: &'a Entry) -> Result<AuthenticatedEntry<'a>, AuthError> {
        if let Err(e) = validate_ext_ids(entry) {
            warn!(
                entry_hash = %hex_prefix(&entry.hash),
                error = %e,
                "Entry authentication failed"
            );
            return Err(e);
        }

        let signers = signer_rcds(entry)?;
        debug!(
            entry_hash = %hex_prefix(&entry.hash),
            signers = signers.len(),
            "Entry authenticated"
        );
        Ok(AuthenticatedEntry { entry, signers })
    }
}

fn hex_prefix(hash: &[u8; 32]) -> String {
    hex::encode(&hash[..8])
}
