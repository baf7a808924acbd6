//! # FAT Telemetry
//!
//! Structured logging for the FAT ledger core.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fat_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//!
//!     // Application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FATD_SERVICE_NAME` | `fatd` | Service name in the startup line |
//! | `FATD_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `FATD_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `FATD_JSON_LOGS` | `false` | JSON formatted logs |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install global subscriber: {0}")]
    SubscriberInit(String),
}

/// Span carrying the chain context for every entry processed on it.
///
/// # Example
///
/// ```rust,ignore
/// use fat_telemetry::chain_span;
///
/// let _span = chain_span!("apply_entry", chain = %chain_hex, entry_id = 42).entered();
/// ```
#[macro_export]
macro_rules! chain_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

/// Log an entry-related event with standard fields.
#[macro_export]
macro_rules! log_entry_event {
    ($level:ident, $msg:expr, $entry_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            entry_hash = %$entry_hash,
            $($($field)*,)?
            $msg
        )
    };
}
