//! # External-id Validation
//!
//! Structure, anti-replay timestamp and signature checks over the
//! `[salt, rcd_0, sig_0, ...]` external-id layout.

use crate::domain::errors::AuthError;
use chrono::{DateTime, TimeDelta, Utc};
use ed25519_dalek::{Signature, VerifyingKey};
use shared_types::{sha512, Bytes32, Entry, Rcd, RCD_SIZE, RCD_TYPE_1};

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Maximum distance between the timestamp salt and the entry timestamp.
pub const TIMESTAMP_SALT_WINDOW_SECS: i64 = 12 * 60 * 60;

/// Outcome of verifying one RCD/signature pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairVerification {
    pub pair: usize,
    pub rcd: Rcd,
    pub valid: bool,
}

/// Per-pair verification outcome, in pair order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureReport {
    pub pairs: Vec<PairVerification>,
}

impl SignatureReport {
    pub fn all_valid(&self) -> bool {
        self.pairs.iter().all(|p| p.valid)
    }

    /// Indices of the pairs whose signature did not verify.
    pub fn failed_pairs(&self) -> Vec<usize> {
        self.pairs
            .iter()
            .filter(|p| !p.valid)
            .map(|p| p.pair)
            .collect()
    }

    pub fn first_failure(&self) -> Option<usize> {
        self.pairs.iter().find(|p| !p.valid).map(|p| p.pair)
    }
}

/// Full external-id check: structure, then timestamp, then signatures.
pub fn validate_ext_ids(entry: &Entry) -> Result<(), AuthError> {
    validate_structure(entry)?;
    validate_timestamp(entry)?;
    validate_signatures(entry)
}

/// Check the external-id count and the size/type of every pair.
pub fn validate_structure(entry: &Entry) -> Result<(), AuthError> {
    let count = entry.ext_ids.len();
    if count < 3 || count % 2 != 1 {
        return Err(AuthError::InvalidExtIdCount(count));
    }
    for (pair, chunk) in entry.ext_ids[1..].chunks_exact(2).enumerate() {
        let (rcd, sig) = (&chunk[0], &chunk[1]);
        if rcd.len() != RCD_SIZE {
            return Err(AuthError::InvalidRcdSize {
                pair,
                size: rcd.len(),
            });
        }
        if rcd[0] != RCD_TYPE_1 {
            return Err(AuthError::InvalidRcdType {
                pair,
                rcd_type: rcd[0],
            });
        }
        if sig.len() != SIGNATURE_SIZE {
            return Err(AuthError::InvalidSignatureSize {
                pair,
                size: sig.len(),
            });
        }
    }
    Ok(())
}

/// Check that the timestamp salt lies within 12 hours of the entry
/// timestamp, inclusive.
pub fn validate_timestamp(entry: &Entry) -> Result<(), AuthError> {
    let salt = entry
        .ext_ids
        .first()
        .ok_or(AuthError::InvalidExtIdCount(0))?;
    let salt_time = parse_timestamp_salt(salt)?;

    let diff = entry.timestamp - salt_time;
    let window = TimeDelta::seconds(TIMESTAMP_SALT_WINDOW_SECS);
    if diff > window || diff < -window {
        return Err(AuthError::TimestampSaltExpired {
            diff_secs: diff.num_seconds(),
        });
    }
    Ok(())
}

/// Verify every pair, stopping at the first failure.
///
/// Assumes [`validate_structure`] has passed.
pub fn validate_signatures(entry: &Entry) -> Result<(), AuthError> {
    let n = pair_count(entry);
    let width = index_salt_width(n);
    for pair in 0..n {
        if !verify_pair(entry, pair, width) {
            return Err(AuthError::InvalidSignature { pair });
        }
    }
    Ok(())
}

/// Verify every pair in parallel and report each outcome.
pub fn verify_signature_pairs(entry: &Entry) -> Result<SignatureReport, AuthError> {
    use rayon::prelude::*;

    validate_structure(entry)?;
    let n = pair_count(entry);
    let width = index_salt_width(n);

    let pairs = (0..n)
        .into_par_iter()
        .map(|pair| -> Result<PairVerification, AuthError> {
            Ok(PairVerification {
                pair,
                rcd: rcd_at(entry, pair)?,
                valid: verify_pair(entry, pair, width),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SignatureReport { pairs })
}

/// The RCDs of every pair, in pair order.
pub fn signer_rcds(entry: &Entry) -> Result<Vec<Rcd>, AuthError> {
    validate_structure(entry)?;
    (0..pair_count(entry))
        .map(|pair| rcd_at(entry, pair))
        .collect()
}

/// Hash signed by pair `index` out of `width`-padded indices.
///
/// The index is written in decimal, right-aligned in a `width`-byte field
/// whose unused leading bytes are zero.
pub(crate) fn signing_hash(
    index: usize,
    width: usize,
    salt: &[u8],
    chain_id: &Bytes32,
    content: &[u8],
) -> [u8; 64] {
    let digits = index.to_string();
    let mut msg = vec![0u8; width.saturating_sub(digits.len())];
    msg.reserve(digits.len() + salt.len() + chain_id.len() + content.len());
    msg.extend_from_slice(digits.as_bytes());
    msg.extend_from_slice(salt);
    msg.extend_from_slice(chain_id);
    msg.extend_from_slice(content);
    sha512(&msg)
}

/// Width of the index salt field: the decimal digit count of `pairs`.
pub(crate) fn index_salt_width(pairs: usize) -> usize {
    pairs.to_string().len()
}

fn pair_count(entry: &Entry) -> usize {
    entry.ext_ids.len() / 2
}

fn rcd_at(entry: &Entry, pair: usize) -> Result<Rcd, AuthError> {
    let raw = &entry.ext_ids[1 + pair * 2];
    Rcd::from_slice(raw).map_err(|_| AuthError::InvalidRcdSize {
        pair,
        size: raw.len(),
    })
}

fn verify_pair(entry: &Entry, pair: usize, width: usize) -> bool {
    let rcd = &entry.ext_ids[1 + pair * 2];
    let sig = &entry.ext_ids[2 + pair * 2];

    let Ok(public_key) = <[u8; 32]>::try_from(&rcd[1..]) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; SIGNATURE_SIZE]>::try_from(sig.as_slice()) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key) else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);

    let hash = signing_hash(
        pair,
        width,
        &entry.ext_ids[0],
        &entry.chain_id,
        &entry.content,
    );
    verifying_key.verify_strict(&hash, &signature).is_ok()
}

fn parse_timestamp_salt(salt: &[u8]) -> Result<DateTime<Utc>, AuthError> {
    let text =
        std::str::from_utf8(salt).map_err(|e| AuthError::InvalidTimestampSalt(e.to_string()))?;
    let secs: i64 = text
        .parse()
        .map_err(|e: std::num::ParseIntError| AuthError::InvalidTimestampSalt(e.to_string()))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AuthError::InvalidTimestampSalt(format!("out of range: {secs}")))
}
