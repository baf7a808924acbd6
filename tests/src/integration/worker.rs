//! # Chain Worker
//!
//! Ordered processing on the per-chain worker and its reaction to storage
//! failure.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fat_02_balance_ledger::{BalanceLedger, LedgerError, LedgerStore, StoreError};
    use fat_05_chain_processor::{
        ChainProcessor, ChainWorker, ProcessError, RuntimeConfig, WorkerError,
    };
    use fat_telemetry::init_test_logging;
    use shared_types::Address;
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_worker_applies_long_sequence_in_order() {
        init_test_logging();
        let alice = user(1);
        let bob = user(2);
        let worker = ChainWorker::spawn(memory_processor().unwrap(), 1);

        worker
            .submit(signed(&fat0_issuance(20), &[issuer()]).unwrap(), 1)
            .await
            .unwrap();
        worker
            .submit(
                signed(&fat0_transfer(Address::coinbase(), alice.address(), 20), &[issuer()])
                    .unwrap(),
                2,
            )
            .await
            .unwrap();
        for id in 3..23 {
            let entry =
                signed(&fat0_transfer(alice.address(), bob.address(), 1), &[alice.clone()])
                    .unwrap();
            worker.submit(entry, id).await.unwrap();
        }
        // Supply is exhausted.
        worker
            .submit(
                signed(&fat0_transfer(Address::coinbase(), alice.address(), 1), &[issuer()])
                    .unwrap(),
                23,
            )
            .await
            .unwrap();

        let (processor, summary) = worker.finish().await.unwrap();
        assert_eq!(summary.applied, 22);
        assert_eq!(summary.rejected, 1);
        assert!(summary.halted.is_none());
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 0);
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 20);
        assert_eq!(processor.issued(), 20);
    }

    #[tokio::test]
    async fn test_storage_failure_halts_worker() {
        init_test_logging();
        let alice = user(1);
        let bob = user(2);

        let store = FaultyStore::new();
        let fail_writes = store.switch();
        let ledger = BalanceLedger::open(store).unwrap();
        let mut processor = ChainProcessor::open(CHAIN_ID, issuer().rcd(), ledger).unwrap();
        for (id, content) in [
            fat0_issuance(-1),
            fat0_transfer(Address::coinbase(), alice.address(), 10),
        ]
        .iter()
        .enumerate()
        {
            let entry = signed(content, &[issuer()]).unwrap();
            assert!(processor
                .process_entry(&entry, id as u64 + 1)
                .unwrap()
                .is_applied());
        }

        fail_writes.store(true, Ordering::SeqCst);
        let worker = ChainWorker::spawn(processor, 4);
        let transfer =
            signed(&fat0_transfer(alice.address(), bob.address(), 3), &[alice.clone()]).unwrap();
        worker.submit(transfer, 3).await.unwrap();

        while !worker.is_stopped() {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        let late =
            signed(&fat0_transfer(alice.address(), bob.address(), 1), &[alice.clone()]).unwrap();
        assert!(matches!(
            worker.submit(late, 4).await,
            Err(WorkerError::Stopped)
        ));

        let (processor, summary) = worker.finish().await.unwrap();
        assert_eq!(summary.applied, 0);
        let halted = summary.halted.unwrap();
        assert_eq!(
            halted,
            ProcessError::Ledger(LedgerError::Storage(StoreError::Unavailable(
                "disk detached".into()
            )))
        );
        assert_eq!(halted.public_message(), "internal error");

        // The failed entry left nothing behind.
        fail_writes.store(false, Ordering::SeqCst);
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 10);
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 0);
        assert_eq!(processor.ledger().store().savepoint_depth(), 0);
    }

    #[tokio::test]
    async fn test_worker_sized_from_config() {
        let data_dir = tempfile::tempdir().unwrap();
        let vars: HashMap<&'static str, String> = [
            ("FATD_QUEUE_CAPACITY", "2".to_string()),
            ("FATD_DATA_DIR", data_dir.path().display().to_string()),
        ]
        .into_iter()
        .collect();
        let config = RuntimeConfig::from_lookup(|var| vars.get(var).cloned()).unwrap();
        assert!(config.storage.chain_dir(&CHAIN_ID).starts_with(data_dir.path()));

        let worker = ChainWorker::spawn(memory_processor().unwrap(), config.worker.queue_capacity);
        for id in 1..=3 {
            worker
                .submit(signed(&fat0_issuance(-1), &[issuer()]).unwrap(), id)
                .await
                .unwrap();
        }
        let (processor, summary) = worker.finish().await.unwrap();
        // Only the first issuance counts.
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.rejected, 2);
        assert!(processor.issuance().unwrap().is_unlimited());
    }
}
