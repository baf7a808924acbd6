use crate::domain::context::CallContext;
use crate::domain::errors::SandboxFault;
use crate::domain::value::Value;
use fat_02_balance_ledger::LedgerStore;

/// A virtual machine instance exposing named entry points.
///
/// Host hooks reach the ledger only through the injected [`CallContext`].
pub trait Sandbox<S: LedgerStore> {
    fn has_export(&self, name: &str) -> bool;

    /// Invoke an exported function. Only called for names accepted by
    /// [`has_export`](Self::has_export).
    fn invoke(
        &mut self,
        name: &str,
        ctx: &mut CallContext<'_, S>,
        args: &[Value],
    ) -> Result<Value, SandboxFault>;
}
