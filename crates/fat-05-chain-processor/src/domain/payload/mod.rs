//! # Token Payloads
//!
//! Every payload variant goes through the same
//! [`EntryAuthenticator`](fat_01_entry_authentication::EntryAuthenticator);
//! only decoding and the signer rule differ.
//!
//! | Variant | Must be signed by |
//! |---------|-------------------|
//! | issuance | the issuer |
//! | coinbase transaction | the issuer |
//! | any other transaction | exactly the RCDs of its inputs |

pub mod amounts;
pub mod fat0;
pub mod fat1;
pub mod issuance;

pub use amounts::AddressAmountMap;
pub use fat0::{ContractCall, Fat0Transaction};
pub use fat1::Fat1Transaction;
pub use issuance::{Issuance, TokenType, MAX_PRECISION};

use crate::domain::errors::PayloadError;
use fat_01_entry_authentication::AuthenticatedEntry;
use shared_types::{Address, Rcd};
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub enum Payload {
    Issuance(Issuance),
    Fat0(Fat0Transaction),
    Fat1(Fat1Transaction),
}

impl Payload {
    /// Decode and validate the content of an authenticated entry.
    ///
    /// `issued` is the chain's token type once issuance has happened; until
    /// then the only acceptable payload is the issuance itself.
    pub fn decode(
        entry: &AuthenticatedEntry<'_>,
        issued: Option<TokenType>,
        issuer: &Rcd,
    ) -> Result<Self, PayloadError> {
        let payload = match issued {
            None => {
                let issuance: Issuance = entry.decode()?;
                issuance.valid_data()?;
                verify_issuer(entry, issuer)?;
                Self::Issuance(issuance)
            }
            Some(TokenType::Fat0) => {
                let tx: Fat0Transaction = entry.decode()?;
                tx.valid_data()?;
                if tx.is_coinbase() {
                    verify_issuer(entry, issuer)?;
                } else {
                    verify_input_signers(entry, tx.inputs.addresses().copied())?;
                }
                Self::Fat0(tx)
            }
            Some(TokenType::Fat1) => {
                let tx: Fat1Transaction = entry.decode()?;
                tx.valid_data()?;
                if tx.is_coinbase() {
                    verify_issuer(entry, issuer)?;
                } else {
                    verify_input_signers(entry, tx.inputs.addresses().copied())?;
                }
                Self::Fat1(tx)
            }
        };
        Ok(payload)
    }
}

/// The issuer must be the one and only signer.
pub fn verify_issuer(entry: &AuthenticatedEntry<'_>, issuer: &Rcd) -> Result<(), PayloadError> {
    match entry.signers.as_slice() {
        [signer] if signer == issuer => Ok(()),
        signers => Err(PayloadError::InvalidSigners {
            expected: 1,
            actual: signers.len(),
        }),
    }
}

/// One signing pair per input address and nothing else.
pub fn verify_input_signers(
    entry: &AuthenticatedEntry<'_>,
    inputs: impl IntoIterator<Item = Address>,
) -> Result<(), PayloadError> {
    let inputs: BTreeSet<Address> = inputs.into_iter().collect();
    let signers = entry.signer_addresses();
    if entry.signers.len() != inputs.len() || signers != inputs {
        return Err(PayloadError::InvalidSigners {
            expected: inputs.len(),
            actual: entry.signers.len(),
        });
    }
    Ok(())
}
