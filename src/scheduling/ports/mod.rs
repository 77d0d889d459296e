//! Port contracts for due-date scheduling.
//!
//! Ports define infrastructure-agnostic interfaces used by the automation
//! engine: the external task store it reads and writes, and the ledger that
//! remembers which due dates it pushed out.

pub mod ledger;
pub mod task_store;

pub use ledger::{ExtensionLedger, LedgerError, LedgerResult};
pub use task_store::{TaskStore, TaskStoreError, TaskStoreResult};
