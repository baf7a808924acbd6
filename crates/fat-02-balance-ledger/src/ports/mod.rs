//! Ports layer.

pub mod store;

pub use store::LedgerStore;
