//! # Runtime Configuration
//!
//! Read from environment variables, with defaults for everything.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FATD_STORAGE` | `memory` | Ledger backend: `memory` or `rocksdb` |
//! | `FATD_DATA_DIR` | `./fatd-data` | Directory holding one database per chain |
//! | `FATD_SYNC_WRITES` | `true` | fsync every flushed batch |
//! | `FATD_QUEUE_CAPACITY` | `1024` | Entries buffered per chain worker |

use fat_telemetry::TelemetryConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("queue capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("data directory must not be empty")]
    EmptyDataDir,

    #[error("storage backend {0} is not compiled in")]
    BackendUnavailable(&'static str),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub storage: StorageConfig,
    pub worker: WorkerConfig,
    pub telemetry: TelemetryConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_lookup(|var| env::var(var).ok())?;
        config.telemetry = TelemetryConfig::from_env();
        Ok(config)
    }

    /// Build from any variable source; unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(backend) = parse(&lookup, "FATD_STORAGE")? {
            config.storage.backend = backend;
        }
        if let Some(dir) = lookup("FATD_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(sync) = parse_bool(&lookup, "FATD_SYNC_WRITES")? {
            config.storage.sync_writes = sync;
        }
        if let Some(capacity) = parse(&lookup, "FATD_QUEUE_CAPACITY")? {
            config.worker.queue_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.storage.validate()?;
        self.worker.validate()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Memory,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" => Ok(Self::RocksDb),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Parent directory; each chain gets a subdirectory named by its id.
    pub data_dir: PathBuf,
    pub sync_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./fatd-data"),
            sync_writes: true,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StorageBackend::RocksDb {
            if !cfg!(feature = "rocksdb") {
                return Err(ConfigError::BackendUnavailable("rocksdb"));
            }
            if self.data_dir.as_os_str().is_empty() {
                return Err(ConfigError::EmptyDataDir);
            }
        }
        Ok(())
    }

    /// Database directory of one chain.
    pub fn chain_dir(&self, chain_id: &shared_types::Bytes32) -> PathBuf {
        self.data_dir.join(hex::encode(chain_id))
    }

    #[cfg(feature = "rocksdb")]
    pub fn rocksdb_config(
        &self,
        chain_id: &shared_types::Bytes32,
    ) -> fat_02_balance_ledger::RocksDbLedgerConfig {
        fat_02_balance_ledger::RocksDbLedgerConfig {
            path: self.chain_dir(chain_id),
            sync_writes: self.sync_writes,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Bounded channel size between the entry source and a chain worker.
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

impl WorkerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

fn parse<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

fn parse_bool<F>(lookup: &F, var: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(Some(true)),
            "0" | "false" | "no" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue { var, value }),
        },
    }
}
