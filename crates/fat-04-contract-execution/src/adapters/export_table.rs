//! Closure-backed sandbox.

use crate::domain::context::CallContext;
use crate::domain::errors::SandboxFault;
use crate::domain::value::Value;
use crate::ports::Sandbox;
use fat_02_balance_ledger::LedgerStore;
use std::collections::HashMap;
use std::fmt;

type Export<S> =
    Box<dyn FnMut(&mut CallContext<'_, S>, &[Value]) -> Result<Value, SandboxFault> + Send>;

/// Named native functions standing in for a compiled module.
///
/// Each invocation starts with a fresh step budget when an execution limit
/// is configured; every host hook costs one step.
pub struct ExportTable<S: LedgerStore> {
    exports: HashMap<String, Export<S>>,
    exec_limit: Option<u64>,
}

impl<S: LedgerStore> ExportTable<S> {
    pub fn new() -> Self {
        Self {
            exports: HashMap::new(),
            exec_limit: None,
        }
    }

    pub fn with_exec_limit(mut self, steps: u64) -> Self {
        self.exec_limit = Some(steps);
        self
    }

    pub fn export<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut(&mut CallContext<'_, S>, &[Value]) -> Result<Value, SandboxFault> + Send + 'static,
    {
        self.exports.insert(name.into(), Box::new(f));
        self
    }

    pub fn exec_limit(&self) -> Option<u64> {
        self.exec_limit
    }
}

impl<S: LedgerStore> Default for ExportTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LedgerStore> fmt::Debug for ExportTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.exports.keys().collect();
        names.sort();
        f.debug_struct("ExportTable")
            .field("exports", &names)
            .field("exec_limit", &self.exec_limit)
            .finish()
    }
}

impl<S: LedgerStore> Sandbox<S> for ExportTable<S> {
    fn has_export(&self, name: &str) -> bool {
        self.exports.contains_key(name)
    }

    fn invoke(
        &mut self,
        name: &str,
        ctx: &mut CallContext<'_, S>,
        args: &[Value],
    ) -> Result<Value, SandboxFault> {
        let export = self
            .exports
            .get_mut(name)
            .ok_or_else(|| SandboxFault::Trap(format!("no export named {name}")))?;
        ctx.set_exec_limit(self.exec_limit);
        let result = export(ctx, args);
        ctx.set_exec_limit(None);
        result
    }
}
