//! # Contract Execution Subsystem (FAT-04)
//!
//! Runs an exported contract function inside a scoped ledger transaction and
//! classifies the outcome.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `CallContext` and its host hooks, `call`,
//!   the scoped transaction guard, errors
//! - **Ports Layer** (`ports/`): `Sandbox`, the virtual machine seam
//! - **Adapters Layer** (`adapters/`): `ExportTable`, a closure-backed sandbox
//!
//! ## Outcomes
//!
//! | Outcome | Scope | Result |
//! |---------|-------|--------|
//! | unknown function | never opened | semantic error |
//! | normal return | commit | value |
//! | revert signal | rollback | semantic error |
//! | execution limit exceeded | rollback | semantic error |
//! | self-destruct signal | commit | success |
//! | any other fault | rollback | infrastructure error |

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::ExportTable;
pub use domain::call::call;
pub use domain::context::{CallContext, CallTransaction, HostSignal};
pub use domain::errors::{ContractError, SandboxFault};
pub use domain::value::Value;
pub use ports::Sandbox;
