//! Entry signing: builds `[salt, rcd_0, sig_0, ...]` for a signer set.

use crate::domain::errors::AuthError;
use crate::domain::ext_ids::{index_salt_width, signing_hash, TIMESTAMP_SALT_WINDOW_SECS};
use crate::domain::keys::Signer;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use shared_types::{Bytes32, Entry};

/// Sign `content` for `chain_id`, timestamped now.
///
/// The timestamp salt is "now" minus a random offset below 12 hours.
pub fn sign_entry(
    content: Vec<u8>,
    chain_id: Bytes32,
    signers: &[Signer],
) -> Result<Entry, AuthError> {
    let now = Utc::now();
    let offset = rand::thread_rng().gen_range(0..TIMESTAMP_SALT_WINDOW_SECS);
    let salt = (now - TimeDelta::seconds(offset)).timestamp();
    sign_entry_with_salt(content, chain_id, signers, now, salt)
}

/// Sign with an explicit entry timestamp and timestamp salt.
pub fn sign_entry_with_salt(
    content: Vec<u8>,
    chain_id: Bytes32,
    signers: &[Signer],
    timestamp: DateTime<Utc>,
    salt: i64,
) -> Result<Entry, AuthError> {
    if signers.is_empty() {
        return Err(AuthError::EmptySignerSet);
    }

    let salt = salt.to_string().into_bytes();
    let width = index_salt_width(signers.len());

    let mut ext_ids = Vec::with_capacity(1 + signers.len() * 2);
    ext_ids.push(salt.clone());
    for (index, signer) in signers.iter().enumerate() {
        let hash = signing_hash(index, width, &salt, &chain_id, &content);
        ext_ids.push(signer.rcd().as_bytes().to_vec());
        ext_ids.push(signer.sign_hash(&hash).to_vec());
    }

    Ok(Entry::new(chain_id, ext_ids, content, timestamp)?)
}
