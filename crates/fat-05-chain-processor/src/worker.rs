//! # Chain Worker
//!
//! One worker per token chain. Entries are consumed from a bounded channel
//! in arrival order and processed on a blocking thread, since ledger writes
//! are synchronous. The worker stops at the first infrastructure error and
//! refuses further entries.

use crate::domain::errors::ProcessError;
use crate::service::{ChainProcessor, EntryOutcome};
use fat_02_balance_ledger::{EntryId, LedgerStore};
use fat_telemetry::{chain_span, log_entry_event};
use shared_types::Entry;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("chain worker stopped")]
    Stopped,

    #[error("chain worker panicked: {0}")]
    Panicked(String),
}

/// Counts reported when a worker stops.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WorkerSummary {
    pub applied: u64,
    pub rejected: u64,
    /// The infrastructure error that stopped the worker, if any.
    pub halted: Option<ProcessError>,
}

struct QueuedEntry {
    entry: Entry,
    entry_id: EntryId,
}

pub struct ChainWorker<S: LedgerStore> {
    sender: mpsc::Sender<QueuedEntry>,
    handle: JoinHandle<(ChainProcessor<S>, WorkerSummary)>,
}

impl<S: LedgerStore + 'static> ChainWorker<S> {
    /// Start a worker owning `processor`, buffering up to `capacity` entries.
    pub fn spawn(processor: ChainProcessor<S>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let handle = tokio::task::spawn_blocking(move || run(processor, receiver));
        Self { sender, handle }
    }

    /// Queue an entry, waiting while the buffer is full.
    pub async fn submit(&self, entry: Entry, entry_id: EntryId) -> Result<(), WorkerError> {
        self.sender
            .send(QueuedEntry { entry, entry_id })
            .await
            .map_err(|_| WorkerError::Stopped)
    }

    /// True once the worker no longer accepts entries.
    pub fn is_stopped(&self) -> bool {
        self.sender.is_closed()
    }

    /// Close the queue, wait for the remaining entries, and hand back the
    /// processor.
    pub async fn finish(self) -> Result<(ChainProcessor<S>, WorkerSummary), WorkerError> {
        let Self { sender, handle } = self;
        drop(sender);
        handle
            .await
            .map_err(|e| WorkerError::Panicked(e.to_string()))
    }
}

fn run<S: LedgerStore>(
    mut processor: ChainProcessor<S>,
    mut receiver: mpsc::Receiver<QueuedEntry>,
) -> (ChainProcessor<S>, WorkerSummary) {
    let _span = chain_span!(
        "chain_worker",
        chain = %hex::encode(&processor.chain_id()[..8])
    )
    .entered();
    info!("Chain worker started");

    let mut summary = WorkerSummary::default();
    while let Some(QueuedEntry { entry, entry_id }) = receiver.blocking_recv() {
        match processor.process_entry(&entry, entry_id) {
            Ok(EntryOutcome::Applied) => summary.applied += 1,
            Ok(EntryOutcome::Rejected(_)) => summary.rejected += 1,
            Err(e) => {
                log_entry_event!(
                    error,
                    "Chain worker halted",
                    hex::encode(&entry.hash[..8]),
                    entry_id,
                    error = %e
                );
                summary.halted = Some(e);
                break;
            }
        }
    }
    receiver.close();

    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        "Chain worker stopped"
    );
    (processor, summary)
}
