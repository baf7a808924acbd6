//! Domain layer for entry authentication.

pub mod content;
pub mod errors;
pub mod ext_ids;
pub mod keys;
pub mod signing;
