//! Scoped ledger transaction for one call.

use crate::domain::context::CallContext;
use fat_02_balance_ledger::{Checkpoint, LedgerError, LedgerStore};
use std::ops::{Deref, DerefMut};
use tracing::error;

/// Holds a ledger checkpoint open for the duration of a call.
///
/// Closed exactly once by [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). Dropped while still open, it rolls back.
pub struct ScopedTransaction<'c, 'a, S: LedgerStore> {
    ctx: &'c mut CallContext<'a, S>,
    checkpoint: Option<Checkpoint>,
}

impl<'c, 'a, S: LedgerStore> ScopedTransaction<'c, 'a, S> {
    pub fn open(ctx: &'c mut CallContext<'a, S>) -> Result<Self, LedgerError> {
        let checkpoint = ctx.ledger_mut().checkpoint()?;
        Ok(Self {
            ctx,
            checkpoint: Some(checkpoint),
        })
    }

    pub fn commit(mut self) -> Result<(), LedgerError> {
        match self.checkpoint.take() {
            Some(checkpoint) => self.ctx.ledger_mut().commit(checkpoint),
            None => Ok(()),
        }
    }

    pub fn rollback(mut self) -> Result<(), LedgerError> {
        match self.checkpoint.take() {
            Some(checkpoint) => self.ctx.ledger_mut().rollback(checkpoint),
            None => Ok(()),
        }
    }
}

impl<'a, S: LedgerStore> Deref for ScopedTransaction<'_, 'a, S> {
    type Target = CallContext<'a, S>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<S: LedgerStore> DerefMut for ScopedTransaction<'_, '_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl<S: LedgerStore> Drop for ScopedTransaction<'_, '_, S> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            error!("Scoped transaction dropped while open; rolling back");
            if let Err(e) = self.ctx.ledger_mut().rollback(checkpoint) {
                error!(error = %e, "Rollback of dropped scoped transaction failed");
            }
        }
    }
}
