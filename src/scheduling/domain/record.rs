//! Snapshot of an externally-owned task as observed through the task store.

use super::{Priority, TaskGid};
use chrono::NaiveDate;

/// Read-only view of a task fetched from the external task store.
///
/// Tasks are owned by the external service; this type only captures the
/// fields the automation rules consult. A missing priority means the task
/// carries no `Priority` custom field at all and is left alone by the
/// default due-date pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    gid: TaskGid,
    name: String,
    due_on: Option<NaiveDate>,
    priority: Option<Priority>,
}

impl TaskRecord {
    /// Creates a task snapshot with no due date and no priority.
    #[must_use]
    pub fn new(gid: TaskGid, name: impl Into<String>) -> Self {
        Self {
            gid,
            name: name.into(),
            due_on: None,
            priority: None,
        }
    }

    /// Sets the observed due date.
    #[must_use]
    pub const fn with_due_on(mut self, due_on: NaiveDate) -> Self {
        self.due_on = Some(due_on);
        self
    }

    /// Sets the observed priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn gid(&self) -> &TaskGid {
        &self.gid
    }

    /// Returns the task name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the observed due date, if any.
    #[must_use]
    pub const fn due_on(&self) -> Option<NaiveDate> {
        self.due_on
    }

    /// Returns the observed priority, if the task carries one.
    #[must_use]
    pub const fn priority(&self) -> Option<Priority> {
        self.priority
    }
}
