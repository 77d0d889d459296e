//! Port for the external task store the automation engine reads and writes.

use crate::scheduling::domain::{ProjectGid, SectionGid, TaskGid, TaskRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// External task store contract.
///
/// All operations are request/response against a service the engine does
/// not own. Any failure is surfaced as a [`TaskStoreError`]; the engine
/// decides whether a failure is recoverable (per-item) or aborts a cycle
/// (bulk listings).
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Lists every task in the given project.
    async fn project_tasks(&self, project: &ProjectGid) -> TaskStoreResult<Vec<TaskRecord>>;

    /// Lists every task currently in the given section.
    async fn section_tasks(&self, section: &SectionGid) -> TaskStoreResult<Vec<TaskRecord>>;

    /// Fetches the details of a single task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn fetch_task(&self, task: &TaskGid) -> TaskStoreResult<TaskRecord>;

    /// Sets the task's due date.
    ///
    /// The operation is idempotent: writing the same date twice is
    /// indistinguishable from writing it once.
    async fn set_due_date(&self, task: &TaskGid, due_on: NaiveDate) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// The request never produced a usable response.
    #[error("transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The store answered with a non-success status.
    #[error("unexpected status {status} from task store")]
    UnexpectedStatus {
        /// HTTP-style status code reported by the store.
        status: u16,
    },

    /// The response body did not decode into the expected shape.
    #[error("failed to decode task payload: {0}")]
    Decode(String),

    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskGid),
}

impl TaskStoreError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
