//! # FAT Ledger Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared signers, chains and entry builders
//! └── integration/
//!     ├── flows.rs      # Authentication -> payload -> ledger
//!     ├── contracts.rs  # Contract calls through the chain processor
//!     └── worker.rs     # Per-chain worker, including storage failure
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fat-tests
//! cargo test -p fat-tests integration::worker::
//!
//! # Benchmarks
//! cargo bench -p fat-tests
//! ```

pub mod fixtures;
pub mod integration;
