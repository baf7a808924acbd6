//! # NFToken Ownership Subsystem (FAT-03)
//!
//! Sets of non-fungible token ids and the mapping from addresses to the ids
//! they hold.
//!
//! ## Invariants
//!
//! - Within one `AddressNFTokensMap`, every id appears under at most one
//!   address
//! - No map or set holds more than [`MAX_CAPACITY`] ids
//! - A transfer conserves ids: inputs and outputs hold the same id set
//!
//! ## JSON Form
//!
//! ```text
//! {"FA2...":[1,2,{"min":10,"max":20}],"FA3...":[5]}
//! ```
//!
//! Uniqueness is checked through an on-demand reverse index
//! ([`AddressNFTokensMap::reverse_index`]).

pub mod domain;

pub use domain::errors::NFTokenError;
pub use domain::map::AddressNFTokensMap;
pub use domain::tokens::{NFTokenId, NFTokens, MAX_CAPACITY};
