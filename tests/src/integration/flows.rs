//! # Entry Flows
//!
//! Signed entries travelling through authentication, payload decoding and
//! the balance ledger together.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use fat_01_entry_authentication::{verify_signature_pairs, AuthError, EntryAuthenticator};
    use fat_02_balance_ledger::{
        BalanceLedger, Direction, InMemoryLedgerStore, LedgerError, LedgerStore,
    };
    use fat_03_nftokens::AddressNFTokensMap;
    use fat_05_chain_processor::{ChainProcessor, EntryOutcome, PayloadError, ProcessError};
    use proptest::prelude::*;
    use shared_types::Address;

    // =========================================================================
    // LEDGER
    // =========================================================================

    #[test]
    fn test_overdraft_leaves_balance_untouched() {
        let mut ledger = BalanceLedger::open(InMemoryLedgerStore::new()).unwrap();
        let alice = user(1).address();

        ledger.credit(&alice, 100).unwrap();
        ledger.debit(&alice, 60).unwrap();
        assert_eq!(
            ledger.debit(&alice, 50).unwrap_err(),
            LedgerError::InsufficientBalance { address: alice }
        );
        assert_eq!(ledger.balance_of(&alice).unwrap().unwrap().1, 40);
    }

    #[test]
    fn test_overdraft_through_processor() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let bob = user(2);

        let entries = [
            signed(&fat0_issuance(-1), &[issuer()]),
            signed(
                &fat0_transfer(Address::coinbase(), alice.address(), 100),
                &[issuer()],
            ),
            signed(&fat0_transfer(alice.address(), bob.address(), 60), &[alice.clone()]),
        ];
        for (i, entry) in entries.into_iter().enumerate() {
            let outcome = processor.process_entry(&entry.unwrap(), i as u64 + 1).unwrap();
            assert!(outcome.is_applied(), "entry {i}: {outcome:?}");
        }

        let overdraft =
            signed(&fat0_transfer(alice.address(), bob.address(), 50), &[alice.clone()]).unwrap();
        assert_eq!(
            processor.process_entry(&overdraft, 4).unwrap(),
            EntryOutcome::Rejected(
                LedgerError::InsufficientBalance {
                    address: alice.address()
                }
                .into()
            )
        );
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 40);
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 60);
        assert_eq!(processor.issued(), 100);
    }

    #[test]
    fn test_audit_trail_links_both_sides() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let bob = user(2);
        processor
            .process_entry(&signed(&fat0_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();
        processor
            .process_entry(
                &signed(&fat0_transfer(Address::coinbase(), alice.address(), 9), &[issuer()])
                    .unwrap(),
                2,
            )
            .unwrap();
        processor
            .process_entry(
                &signed(&fat0_transfer(alice.address(), bob.address(), 4), &[alice.clone()])
                    .unwrap(),
                3,
            )
            .unwrap();

        let ledger = processor.ledger();
        let alice_edges: Vec<_> = ledger
            .transactions_of(&alice.address())
            .unwrap()
            .into_iter()
            .map(|tx| (tx.entry_id, tx.direction))
            .collect();
        assert_eq!(
            alice_edges,
            vec![(2, Direction::Incoming), (3, Direction::Outgoing)]
        );
        let bob_edges = ledger.transactions_of(&bob.address()).unwrap();
        assert_eq!(bob_edges.len(), 1);
        assert_eq!(bob_edges[0].direction, Direction::Incoming);
        assert_eq!(ledger.circulating_count(true).unwrap(), 2);
    }

    // =========================================================================
    // AUTHENTICATION
    // =========================================================================

    #[test]
    fn test_tampered_signature_names_its_pair() {
        let alice = user(1);
        let bob = user(2);
        let content = format!(
            r#"{{"inputs":{{"{}":1,"{}":1}},"outputs":{{"{}":2}}}}"#,
            alice.address(),
            bob.address(),
            user(3).address()
        );
        let mut entry = signed(&content, &[alice, bob]).unwrap();
        // [salt, rcd_0, sig_0, rcd_1, sig_1]
        entry.ext_ids[2][0] ^= 0x01;

        let report = verify_signature_pairs(&entry).unwrap();
        assert_eq!(report.failed_pairs(), vec![0]);
        assert!(report.pairs[1].valid);

        assert_eq!(
            EntryAuthenticator::new().authenticate(&entry).unwrap_err(),
            AuthError::InvalidSignature { pair: 0 }
        );
    }

    #[test]
    fn test_tampered_entry_rejected_by_processor() {
        let mut processor = memory_processor().unwrap();
        let mut entry = signed(&fat0_issuance(-1), &[issuer()]).unwrap();
        entry.content = fat0_issuance(1_000).into_bytes();

        assert_eq!(
            processor.process_entry(&entry, 1).unwrap(),
            EntryOutcome::Rejected(AuthError::InvalidSignature { pair: 0 }.into())
        );
        assert!(processor.issuance().is_none());
    }

    #[test]
    fn test_transfer_signed_by_stranger_rejected() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let mallory = user(6);
        processor
            .process_entry(&signed(&fat0_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();
        processor
            .process_entry(
                &signed(&fat0_transfer(Address::coinbase(), alice.address(), 5), &[issuer()])
                    .unwrap(),
                2,
            )
            .unwrap();

        let theft = signed(
            &fat0_transfer(alice.address(), mallory.address(), 5),
            &[mallory.clone()],
        )
        .unwrap();
        let outcome = processor.process_entry(&theft, 3).unwrap();
        assert!(matches!(
            outcome,
            EntryOutcome::Rejected(ProcessError::Payload(PayloadError::InvalidSigners { .. }))
        ));
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 5);
    }

    #[test]
    fn test_coinbase_requires_issuer() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        processor
            .process_entry(&signed(&fat0_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();

        let self_mint =
            signed(&fat0_transfer(Address::coinbase(), alice.address(), 5), &[alice.clone()])
                .unwrap();
        let outcome = processor.process_entry(&self_mint, 2).unwrap();
        assert!(!outcome.is_applied());
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 0);
        assert_eq!(processor.issued(), 0);
    }

    // =========================================================================
    // FAT-1
    // =========================================================================

    #[test]
    fn test_fat1_ownership_follows_transfers() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let bob = user(2);
        processor
            .process_entry(&signed(&fat1_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();
        let mint = signed(
            &fat1_transfer(Address::coinbase(), alice.address(), &[1, 2]),
            &[issuer()],
        )
        .unwrap();
        assert!(processor.process_entry(&mint, 2).unwrap().is_applied());

        let steal =
            signed(&fat1_transfer(bob.address(), bob.address(), &[2]), &[bob.clone()]).unwrap();
        assert!(!processor.process_entry(&steal, 3).unwrap().is_applied());

        let unowned =
            signed(&fat1_transfer(bob.address(), alice.address(), &[2]), &[bob.clone()]).unwrap();
        assert_eq!(
            processor.process_entry(&unowned, 4).unwrap(),
            EntryOutcome::Rejected(
                PayloadError::NotOwner {
                    token: 2,
                    address: bob.address()
                }
                .into()
            )
        );

        let gift =
            signed(&fat1_transfer(alice.address(), bob.address(), &[2]), &[alice.clone()]).unwrap();
        assert!(processor.process_entry(&gift, 5).unwrap().is_applied());

        let ledger = processor.ledger();
        let alice_id = ledger.balance_of(&alice.address()).unwrap().unwrap().0;
        let bob_id = ledger.balance_of(&bob.address()).unwrap().unwrap().0;
        assert_eq!(ledger.nftoken_owner(1).unwrap(), Some(alice_id));
        assert_eq!(ledger.nftoken_owner(2).unwrap(), Some(bob_id));
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 1);
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 1);
    }

    #[test]
    fn test_fat1_range_mint_matches_map_owners() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let bob = user(2);
        processor
            .process_entry(&signed(&fat1_issuance(-1), &[issuer()]).unwrap(), 1)
            .unwrap();

        let outputs = format!(
            r#"{{"{}":[{{"min":0,"max":9}}],"{}":[10,12]}}"#,
            alice.address(),
            bob.address()
        );
        let map = AddressNFTokensMap::from_json(outputs.as_bytes()).unwrap();
        assert_eq!(map.num_token_ids(), 12);

        let mint = format!(
            r#"{{"inputs":{{"{}":[{{"min":0,"max":10}},12]}},"outputs":{outputs}}}"#,
            Address::coinbase()
        );
        let entry = signed(&mint, &[issuer()]).unwrap();
        assert!(processor.process_entry(&entry, 2).unwrap().is_applied());

        let ledger = processor.ledger();
        for (id, owner) in map.reverse_index().unwrap() {
            let expected = ledger.balance_of(&owner).unwrap().unwrap().0;
            assert_eq!(ledger.nftoken_owner(id).unwrap(), Some(expected), "token {id}");
        }
        assert_eq!(ledger.nftoken_owner(11).unwrap(), None);
        assert_eq!(balance_of(&processor, &alice.address()).unwrap(), 10);
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 2);
    }

    #[test]
    fn test_fat1_supply_cap_counts_ids() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        processor
            .process_entry(&signed(&fat1_issuance(3), &[issuer()]).unwrap(), 1)
            .unwrap();

        let too_many = signed(
            &fat1_transfer(Address::coinbase(), alice.address(), &[0, 1, 2, 3]),
            &[issuer()],
        )
        .unwrap();
        assert!(matches!(
            processor.process_entry(&too_many, 2).unwrap(),
            EntryOutcome::Rejected(ProcessError::Payload(PayloadError::SupplyExceeded { .. }))
        ));

        let exact = signed(
            &fat1_transfer(Address::coinbase(), alice.address(), &[0, 1, 2]),
            &[issuer()],
        )
        .unwrap();
        assert!(processor.process_entry(&exact, 3).unwrap().is_applied());
        assert_eq!(processor.issued(), 3);
    }

    #[test]
    fn test_fat1_chain_resumes_from_its_ledger() {
        let mut processor = memory_processor().unwrap();
        let alice = user(1);
        let bob = user(2);
        for (id, content) in [
            fat1_issuance(4),
            fat1_transfer(Address::coinbase(), alice.address(), &[0, 1, 2]),
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

        let ledger = processor.into_ledger();
        let mut processor = ChainProcessor::open(CHAIN_ID, issuer().rcd(), ledger).unwrap();
        assert_eq!(processor.issued(), 3);

        let send = signed(&fat1_transfer(alice.address(), bob.address(), &[1]), &[alice]).unwrap();
        assert!(processor.process_entry(&send, 3).unwrap().is_applied());
        assert_eq!(balance_of(&processor, &bob.address()).unwrap(), 1);

        let past_cap = signed(
            &fat1_transfer(Address::coinbase(), bob.address(), &[3, 4]),
            &[issuer()],
        )
        .unwrap();
        assert!(matches!(
            processor.process_entry(&past_cap, 4).unwrap(),
            EntryOutcome::Rejected(ProcessError::Payload(PayloadError::SupplyExceeded {
                requested: 2,
                remaining: 1
            }))
        ));
    }

    // =========================================================================
    // CONSERVATION
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Transfers never create or destroy value, applied or rejected.
        #[test]
        fn prop_fat0_transfers_conserve_supply(
            transfers in prop::collection::vec((0usize..4, 0usize..4, 1u64..400), 1..12)
        ) {
            let users: Vec<_> = (1..=4).map(user).collect();
            let mut processor = memory_processor().unwrap();
            processor
                .process_entry(&signed(&fat0_issuance(1_000), &[issuer()]).unwrap(), 1)
                .unwrap();
            processor
                .process_entry(
                    &signed(
                        &fat0_transfer(Address::coinbase(), users[0].address(), 1_000),
                        &[issuer()],
                    )
                    .unwrap(),
                    2,
                )
                .unwrap();

            for (i, (from, to, amount)) in transfers.into_iter().enumerate() {
                let content = fat0_transfer(users[from].address(), users[to].address(), amount);
                let entry = signed(&content, &[users[from].clone()]).unwrap();
                let outcome = processor.process_entry(&entry, i as u64 + 3).unwrap();
                if from == to {
                    prop_assert!(!outcome.is_applied());
                }
            }

            let total: u64 = users
                .iter()
                .map(|u| balance_of(&processor, &u.address()).unwrap())
                .sum();
            prop_assert_eq!(total, 1_000);
            prop_assert_eq!(processor.ledger().store().savepoint_depth(), 0);
        }
    }
}
