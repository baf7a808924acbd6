//! # Contract Calls
//!
//! FAT-0 transactions whose single output is a registered contract.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fat_02_balance_ledger::{InMemoryLedgerStore, LedgerStore};
    use fat_04_contract_execution::{ContractError, ExportTable, Value};
    use fat_05_chain_processor::{ChainProcessor, EntryOutcome};
    use shared_types::Address;
    use std::sync::{Arc, Mutex};

    const JAR: Address = Address::new([0x1A; 32]);

    /// Processor with alice holding 100 and the tip jar registered.
    fn funded(jar: ExportTable<InMemoryLedgerStore>) -> ChainProcessor<InMemoryLedgerStore> {
        let mut processor = memory_processor().unwrap();
        processor.register_contract(JAR, jar);
        processor
            .process_entry(&signed(&fat0_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();
        processor
            .process_entry(
                &signed(&fat0_transfer(Address::coinbase(), user(1).address(), 100), &[issuer()])
                    .unwrap(),
                2,
            )
            .unwrap();
        processor
    }

    fn call(
        processor: &mut ChainProcessor<InMemoryLedgerStore>,
        amount: u64,
        func: &str,
    ) -> EntryOutcome {
        let alice = user(1);
        let entry = signed(&contract_call(alice.address(), JAR, amount, func), &[alice]).unwrap();
        processor.process_entry(&entry, 3).unwrap()
    }

    #[test]
    fn test_tip_jar_forwards_to_beneficiary() {
        let beneficiary = user(9).address();
        let jar = ExportTable::new().export("forward", move |ctx, _| {
            let amount = ctx.amount()?;
            ctx.send(amount, &beneficiary)?;
            Ok(Value::Void)
        });
        let mut processor = funded(jar);

        assert!(call(&mut processor, 30, "forward").is_applied());
        assert_eq!(balance_of(&processor, &user(1).address()).unwrap(), 70);
        assert_eq!(balance_of(&processor, &JAR).unwrap(), 0);
        assert_eq!(balance_of(&processor, &beneficiary).unwrap(), 30);
    }

    #[test]
    fn test_contract_sees_entry_context() {
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let jar = ExportTable::new().export("observe", move |ctx, _| {
            let observed = (ctx.height()?, ctx.sender()?, ctx.timestamp()?, ctx.entry_hash()?);
            if let Ok(mut slot) = record.lock() {
                *slot = Some(observed);
            }
            Ok(Value::Void)
        });
        let mut processor = funded(jar);
        processor.set_height(77);

        let alice = user(1);
        let entry = signed(&contract_call(alice.address(), JAR, 1, "observe"), &[alice.clone()])
            .unwrap();
        assert!(processor.process_entry(&entry, 3).unwrap().is_applied());

        let observed = seen.lock().unwrap().take().unwrap();
        assert_eq!(
            observed,
            (77, alice.address(), entry.timestamp.timestamp(), entry.hash)
        );
    }

    #[test]
    fn test_overspending_contract_reverts_transfer() {
        let jar = ExportTable::new().export("overpay", |ctx, _| {
            let amount = ctx.amount()?;
            ctx.send(amount + 1, &user(1).address())?;
            Ok(Value::Void)
        });
        let mut processor = funded(jar);

        let outcome = call(&mut processor, 10, "overpay");
        assert!(matches!(
            outcome,
            EntryOutcome::Rejected(ref e) if !e.tier().is_fatal()
        ));
        assert_eq!(balance_of(&processor, &user(1).address()).unwrap(), 100);
        assert_eq!(balance_of(&processor, &JAR).unwrap(), 0);
        assert_eq!(processor.ledger().store().savepoint_depth(), 0);
    }

    #[test]
    fn test_exec_limit_rejects_entry() {
        let jar = ExportTable::new().with_exec_limit(3).export("spin", |ctx, _| loop {
            ctx.balance()?;
        });
        let mut processor = funded(jar);

        assert_eq!(
            call(&mut processor, 5, "spin"),
            EntryOutcome::Rejected(ContractError::ExecLimitExceeded.into())
        );
        assert_eq!(balance_of(&processor, &user(1).address()).unwrap(), 100);
    }

    #[test]
    fn test_self_destruct_keeps_writes() {
        let jar = ExportTable::new().export("burn_and_close", |ctx, _| {
            let amount = ctx.amount()?;
            ctx.burn(amount / 2)?;
            Err(ctx.self_destruct())
        });
        let mut processor = funded(jar);

        assert!(call(&mut processor, 10, "burn_and_close").is_applied());
        assert_eq!(balance_of(&processor, &user(1).address()).unwrap(), 90);
        assert_eq!(balance_of(&processor, &JAR).unwrap(), 5);
        assert_eq!(balance_of(&processor, &Address::coinbase()).unwrap(), 5);
    }

    #[test]
    fn test_explicit_revert_then_later_call_succeeds() {
        let jar = ExportTable::new()
            .export("refuse", |ctx, _| Err(ctx.revert("closed")))
            .export("accept", |_, _| Ok(Value::I64(1)));
        let mut processor = funded(jar);

        assert_eq!(
            call(&mut processor, 10, "refuse"),
            EntryOutcome::Rejected(ContractError::Reverted("closed".into()).into())
        );
        assert!(call(&mut processor, 10, "accept").is_applied());
        assert_eq!(balance_of(&processor, &JAR).unwrap(), 10);
    }
}
