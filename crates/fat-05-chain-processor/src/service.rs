//! # Chain Processor
//!
//! Applies the entries of one token chain to its ledger:
//!
//! ```text
//! authenticate -> decode -> validate -> apply (checkpoint) -> contract call (nested checkpoint)
//! ```
//!
//! A semantic failure at any step rejects only the entry, leaving the ledger
//! as it was. An infrastructure failure is returned as an error and the
//! chain must not process further entries.

use crate::domain::errors::{PayloadError, ProcessError};
use crate::domain::payload::{ContractCall, Fat0Transaction, Fat1Transaction, Issuance, Payload};
use fat_01_entry_authentication::EntryAuthenticator;
use fat_02_balance_ledger::{
    BalanceLedger, Direction, EntryId, LedgerError, LedgerStore, StoreError, COINBASE_ID,
};
use fat_04_contract_execution::{call, CallContext, CallTransaction, Sandbox, Value};
use shared_types::{Address, Bytes32, Entry, ErrorTier, Rcd};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, warn};

type Contracts<S> = BTreeMap<Address, Box<dyn Sandbox<S> + Send>>;

/// Result of processing one entry that did not halt the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Applied,
    /// Semantic failure; the ledger is unchanged.
    Rejected(ProcessError),
}

impl EntryOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// State of one token chain.
pub struct ChainProcessor<S: LedgerStore> {
    chain_id: Bytes32,
    issuer: Rcd,
    ledger: BalanceLedger<S>,
    authenticator: EntryAuthenticator,
    issuance: Option<Issuance>,
    /// Total minted by coinbase transactions.
    issued: u64,
    height: u32,
    contracts: Contracts<S>,
}

impl<S: LedgerStore> ChainProcessor<S> {
    /// Resume the chain recorded in `ledger`, or start an unissued one.
    ///
    /// `issuer` authorizes the issuance and every coinbase transaction.
    pub fn open(
        chain_id: Bytes32,
        issuer: Rcd,
        ledger: BalanceLedger<S>,
    ) -> Result<Self, ProcessError> {
        let issuance = ledger
            .issuance_record()?
            .map(|bytes| serde_json::from_slice::<Issuance>(&bytes))
            .transpose()
            .map_err(|e| LedgerError::from(StoreError::Corrupt(format!("issuance: {e}"))))?;
        let issued = ledger.issued_supply()?;
        if let Some(issuance) = &issuance {
            info!(
                token_type = ?issuance.token_type,
                supply = issuance.supply,
                issued,
                "Chain resumed"
            );
        }

        Ok(Self {
            chain_id,
            issuer,
            ledger,
            authenticator: EntryAuthenticator::new(),
            issuance,
            issued,
            height: 0,
            contracts: BTreeMap::new(),
        })
    }

    pub fn chain_id(&self) -> &Bytes32 {
        &self.chain_id
    }

    pub fn ledger(&self) -> &BalanceLedger<S> {
        &self.ledger
    }

    pub fn into_ledger(self) -> BalanceLedger<S> {
        self.ledger
    }

    pub fn issuance(&self) -> Option<&Issuance> {
        self.issuance.as_ref()
    }

    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Block height reported to contracts.
    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// Attach a contract; FAT-0 calls paying `address` invoke it.
    pub fn register_contract<X>(&mut self, address: Address, sandbox: X)
    where
        X: Sandbox<S> + Send + 'static,
    {
        info!(contract = %address, "Contract registered");
        self.contracts.insert(address, Box::new(sandbox));
    }

    /// Process one entry in chain order.
    #[instrument(
        name = "process_entry",
        skip(self, entry),
        fields(
            chain = %hex::encode(&self.chain_id[..8]),
            entry_hash = %hex::encode(&entry.hash[..8]),
        )
    )]
    pub fn process_entry(
        &mut self,
        entry: &Entry,
        entry_id: EntryId,
    ) -> Result<EntryOutcome, ProcessError> {
        match self.apply(entry, entry_id) {
            Ok(()) => {
                debug!("Entry applied");
                Ok(EntryOutcome::Applied)
            }
            Err(e) if e.tier() == ErrorTier::Semantic => {
                warn!(error = %e, "Entry rejected");
                Ok(EntryOutcome::Rejected(e))
            }
            Err(e) => {
                error!(error = %e, "Entry processing failed; chain halted");
                Err(e)
            }
        }
    }

    fn apply(&mut self, entry: &Entry, entry_id: EntryId) -> Result<(), ProcessError> {
        if entry.chain_id != self.chain_id {
            return Err(PayloadError::WrongChain.into());
        }
        let authenticated = self.authenticator.authenticate(entry)?;
        let token_type = self.issuance.as_ref().map(|issuance| issuance.token_type);

        match Payload::decode(&authenticated, token_type, &self.issuer)? {
            Payload::Issuance(issuance) => {
                self.ledger.atomically(|ledger| -> Result<(), ProcessError> {
                    ledger.set_issuance_record(&entry.content)?;
                    Ok(ledger.set_issued_supply(0)?)
                })?;
                info!(
                    token_type = ?issuance.token_type,
                    supply = issuance.supply,
                    "Chain issued"
                );
                self.issuance = Some(issuance);
            }
            Payload::Fat0(tx) => {
                let minted = self.apply_fat0(&tx, entry, entry_id)?;
                self.issued = self.issued.saturating_add(minted);
            }
            Payload::Fat1(tx) => {
                let minted = self.apply_fat1(&tx, entry_id)?;
                self.issued = self.issued.saturating_add(minted);
            }
        }
        Ok(())
    }

    /// Returns the amount minted.
    fn apply_fat0(
        &mut self,
        tx: &Fat0Transaction,
        entry: &Entry,
        entry_id: EntryId,
    ) -> Result<u64, ProcessError> {
        let coinbase = tx.is_coinbase();
        let minted = if coinbase { tx.outputs.sum()? } else { 0 };
        if let Some(issuance) = &self.issuance {
            issuance.check_supply(self.issued, minted)?;
        }
        let precision = self.issuance.as_ref().map_or(0, Issuance::precision);
        let height = self.height;
        let issued = self.issued.saturating_add(minted);
        let contracts = &mut self.contracts;

        self.ledger.atomically(|ledger| -> Result<(), ProcessError> {
            if coinbase {
                ledger.set_issued_supply(issued)?;
            }
            for (address, &amount) in &tx.inputs {
                let id = if coinbase {
                    COINBASE_ID
                } else {
                    ledger.debit(address, amount)?
                };
                ledger.record_transaction(id, entry_id, Direction::Outgoing)?;
            }
            for (address, &amount) in &tx.outputs {
                let id = ledger.credit(address, amount)?;
                ledger.record_transaction(id, entry_id, Direction::Incoming)?;
            }

            if let (Some(contract_call), Some(contract)) = (&tx.contract, tx.contract_address()) {
                let transaction = CallTransaction {
                    sender: tx.inputs.addresses().next().copied().unwrap_or_default(),
                    contract,
                    amount: tx.outputs.get(&contract).unwrap_or(0),
                    entry_hash: entry.hash,
                    timestamp: entry.timestamp.timestamp(),
                    precision,
                };
                run_contract(ledger, contracts, contract_call, transaction, height)?;
            }
            Ok(())
        })?;
        Ok(minted)
    }

    /// Returns the number of ids minted.
    fn apply_fat1(&mut self, tx: &Fat1Transaction, entry_id: EntryId) -> Result<u64, ProcessError> {
        let coinbase = tx.is_coinbase();
        let minted = if coinbase {
            tx.outputs.num_token_ids() as u64
        } else {
            0
        };
        if let Some(issuance) = &self.issuance {
            issuance.check_supply(self.issued, minted)?;
        }
        let issued = self.issued.saturating_add(minted);

        self.ledger.atomically(|ledger| -> Result<(), ProcessError> {
            if coinbase {
                ledger.set_issued_supply(issued)?;
            }
            for (address, tokens) in &tx.inputs {
                let id = if coinbase {
                    for token in tokens.iter() {
                        if ledger.nftoken_owner(token)?.is_some() {
                            return Err(PayloadError::TokenExists(token).into());
                        }
                    }
                    COINBASE_ID
                } else {
                    let owner = ledger.balance_of(address)?.map(|(id, _)| id);
                    for token in tokens.iter() {
                        let held = ledger.nftoken_owner(token)?;
                        if owner.is_none() || held != owner {
                            return Err(PayloadError::NotOwner {
                                token,
                                address: *address,
                            }
                            .into());
                        }
                    }
                    ledger.debit(address, tokens.len() as u64)?
                };
                ledger.record_transaction(id, entry_id, Direction::Outgoing)?;
            }
            for (address, tokens) in &tx.outputs {
                let id = ledger.credit(address, tokens.len() as u64)?;
                for token in tokens.iter() {
                    ledger.assign_nftoken(token, id)?;
                }
                ledger.record_transaction(id, entry_id, Direction::Incoming)?;
            }
            Ok(())
        })?;
        Ok(minted)
    }
}

fn run_contract<S: LedgerStore>(
    ledger: &mut BalanceLedger<S>,
    contracts: &mut Contracts<S>,
    contract_call: &ContractCall,
    transaction: CallTransaction,
    height: u32,
) -> Result<(), ProcessError> {
    let contract = transaction.contract;
    let sandbox = contracts
        .get_mut(&contract)
        .ok_or(PayloadError::UnknownContract(contract))?;
    let args: Vec<Value> = contract_call.args.iter().copied().map(Value::I64).collect();

    let mut ctx = CallContext::new(ledger, height, transaction);
    let value = call(sandbox.as_mut(), &mut ctx, &contract_call.func, &args)?;
    debug!(
        contract = %contract,
        function = %contract_call.func,
        result = ?value,
        "Contract call completed"
    );
    Ok(())
}
