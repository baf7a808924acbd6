//! Ed25519 signing keys and their `Fs...` secret address form.

use ed25519_dalek::{Signer as _, SigningKey};
use shared_types::{decode_check, encode_check, Address, AddressError, Rcd, FS_ADDRESS_PREFIX};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// A secret key able to sign for the address of its RCD.
///
/// The key material is zeroized on drop.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
}

impl Signer {
    /// Create from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let seed = Zeroizing::new(seed);
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }

    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut rand::thread_rng()),
        }
    }

    /// RCD type 1 of the public key.
    pub fn rcd(&self) -> Rcd {
        Rcd::from_public_key(self.key.verifying_key().to_bytes())
    }

    pub fn address(&self) -> Address {
        self.rcd().address()
    }

    /// Sign a 64-byte message hash.
    pub fn sign_hash(&self, hash: &[u8; 64]) -> [u8; 64] {
        self.key.sign(hash).to_bytes()
    }

    /// The `Fs...` string form of the seed.
    pub fn secret_string(&self) -> Zeroizing<String> {
        let seed = Zeroizing::new(self.key.to_bytes());
        Zeroizing::new(encode_check(FS_ADDRESS_PREFIX, &seed))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl FromStr for Signer {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seed = Zeroizing::new(decode_check(FS_ADDRESS_PREFIX, s)?);
        Ok(Self::from_seed(*seed))
    }
}
