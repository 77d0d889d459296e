//! Port for durable extension-record storage.

use crate::scheduling::domain::{ExtensionRecord, TaskGid};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for extension ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Persistent store of extension records, keyed by `(trigger, affected)`.
///
/// Implementations must keep the **first** original due date recorded for a
/// pair: recording the same pair again is a no-op, so a trigger task that
/// re-enters the tracked section before its extensions are restored never
/// overwrites the true baseline.
#[async_trait]
pub trait ExtensionLedger: Send + Sync {
    /// Stores an extension record unless one already exists for the pair.
    async fn record(&self, record: &ExtensionRecord) -> LedgerResult<()>;

    /// Lists all extensions caused by the given trigger task.
    async fn extensions_for(&self, trigger: &TaskGid) -> LedgerResult<Vec<ExtensionRecord>>;

    /// Removes every record for the given trigger task, returning how many
    /// were removed.
    async fn clear(&self, trigger: &TaskGid) -> LedgerResult<usize>;
}

/// Errors returned by extension ledger implementations.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    /// Storage-layer failure.
    #[error("ledger storage failure: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }
}
