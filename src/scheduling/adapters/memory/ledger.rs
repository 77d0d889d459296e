//! In-memory extension ledger.
//!
//! Used by the unit tests and as the runtime fallback when no database is
//! configured; records do not survive a process restart.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::scheduling::{
    domain::{ExtensionRecord, TaskGid},
    ports::{ExtensionLedger, LedgerError, LedgerResult},
};

/// Thread-safe in-memory extension ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExtensionLedger {
    state: Arc<RwLock<BTreeMap<(TaskGid, TaskGid), NaiveDate>>>,
}

impl InMemoryExtensionLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of records across all triggers.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the lock is poisoned.
    pub fn len(&self) -> LedgerResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|err| LedgerError::storage(std::io::Error::other(err.to_string())))?;
        Ok(state.len())
    }

    /// Returns `true` when the ledger holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] when the lock is poisoned.
    pub fn is_empty(&self) -> LedgerResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl ExtensionLedger for InMemoryExtensionLedger {
    async fn record(&self, record: &ExtensionRecord) -> LedgerResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| LedgerError::storage(std::io::Error::other(err.to_string())))?;
        let key = (record.trigger().clone(), record.affected().clone());
        // Keep-first: a pre-existing record owns the true baseline.
        state.entry(key).or_insert_with(|| record.original_due_on());
        Ok(())
    }

    async fn extensions_for(&self, trigger: &TaskGid) -> LedgerResult<Vec<ExtensionRecord>> {
        let state = self
            .state
            .read()
            .map_err(|err| LedgerError::storage(std::io::Error::other(err.to_string())))?;
        let records = state
            .iter()
            .filter(|((record_trigger, _), _)| record_trigger == trigger)
            .map(|((record_trigger, affected), original)| {
                ExtensionRecord::new(record_trigger.clone(), affected.clone(), *original)
            })
            .collect();
        Ok(records)
    }

    async fn clear(&self, trigger: &TaskGid) -> LedgerResult<usize> {
        let mut state = self
            .state
            .write()
            .map_err(|err| LedgerError::storage(std::io::Error::other(err.to_string())))?;
        let before = state.len();
        state.retain(|(record_trigger, _), _| record_trigger != trigger);
        Ok(before - state.len())
    }
}
