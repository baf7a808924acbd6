//! # Chain Processor Subsystem (FAT-05)
//!
//! Wires authentication, payload decoding, the balance ledger, NFToken
//! ownership and contract execution into one per-chain state machine.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): payload variants and errors
//! - **Service Layer** (`service.rs`): `ChainProcessor::process_entry`
//! - **Worker** (`worker.rs`): one Tokio worker per chain, strictly in order
//! - **Config** (`config.rs`): `RuntimeConfig` from environment variables
//!
//! ## Error Tiers
//!
//! | Tier | Effect |
//! |------|--------|
//! | Semantic | entry rejected, ledger unchanged, processing continues |
//! | Infrastructure | processing stops, error surfaced as opaque |

pub mod config;
pub mod domain;
pub mod service;
pub mod worker;

pub use config::{ConfigError, RuntimeConfig, StorageBackend, StorageConfig, WorkerConfig};
pub use domain::errors::{PayloadError, ProcessError};
pub use domain::payload::{
    AddressAmountMap, ContractCall, Fat0Transaction, Fat1Transaction, Issuance, Payload,
    TokenType, MAX_PRECISION,
};
pub use service::{ChainProcessor, EntryOutcome};
pub use worker::{ChainWorker, WorkerError, WorkerSummary};
