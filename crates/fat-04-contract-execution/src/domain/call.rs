//! Contract invocation and outcome classification.

use crate::domain::context::{CallContext, HostSignal};
use crate::domain::errors::{ContractError, SandboxFault};
use crate::domain::scope::ScopedTransaction;
use crate::domain::value::Value;
use crate::ports::Sandbox;
use fat_02_balance_ledger::LedgerStore;
use tracing::{debug, warn};

enum Outcome {
    Commit(Value),
    Rollback(ContractError),
}

/// Run `name` inside a scoped ledger transaction.
///
/// Writes made by the call survive only if it returns normally or
/// self-destructs. A trap that is not explained by a host signal is an
/// infrastructure error.
pub fn call<S, X>(
    sandbox: &mut X,
    ctx: &mut CallContext<'_, S>,
    name: &str,
    args: &[Value],
) -> Result<Value, ContractError>
where
    S: LedgerStore,
    X: Sandbox<S> + ?Sized,
{
    if !sandbox.has_export(name) {
        return Err(ContractError::UnknownFunction(name.to_string()));
    }

    ctx.signal = None;
    let mut scope = ScopedTransaction::open(ctx)?;
    let result = sandbox.invoke(name, &mut scope, args);
    let signal = scope.signal.take();

    match classify(result, signal) {
        Outcome::Commit(value) => {
            scope.commit()?;
            debug!(function = name, "Contract call committed");
            Ok(value)
        }
        Outcome::Rollback(err) => {
            scope.rollback()?;
            warn!(function = name, error = %err, "Contract call rolled back");
            Err(err)
        }
    }
}

/// A host signal takes precedence over whatever the sandbox returned.
fn classify(result: Result<Value, SandboxFault>, signal: Option<HostSignal>) -> Outcome {
    match (signal, result) {
        (Some(HostSignal::Revert(reason)), _) => Outcome::Rollback(ContractError::Reverted(reason)),
        (Some(HostSignal::ExecLimitExceeded), _) | (None, Err(SandboxFault::ExecLimitExceeded)) => {
            Outcome::Rollback(ContractError::ExecLimitExceeded)
        }
        (Some(HostSignal::SelfDestruct), _) => Outcome::Commit(Value::Void),
        (Some(HostSignal::Fault(msg)), _) => Outcome::Rollback(ContractError::Fault(msg)),
        (None, Err(SandboxFault::Trap(msg))) => Outcome::Rollback(ContractError::Trap(msg)),
        (None, Ok(value)) => Outcome::Commit(value),
    }
}
