//! Extension records: the memory of due dates pushed out by a trigger task.

use super::TaskGid;
use chrono::NaiveDate;

/// Records that `trigger` caused `affected`'s due date to be pushed out, and
/// what the due date was beforehand.
///
/// At most one record exists per `(trigger, affected)` pair; recording the
/// pair again preserves the first-stored original so repeated entries never
/// lose the true baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRecord {
    trigger: TaskGid,
    affected: TaskGid,
    original_due_on: NaiveDate,
}

impl ExtensionRecord {
    /// Creates an extension record.
    #[must_use]
    pub const fn new(trigger: TaskGid, affected: TaskGid, original_due_on: NaiveDate) -> Self {
        Self {
            trigger,
            affected,
            original_due_on,
        }
    }

    /// Returns the high-priority task whose entry caused the extension.
    #[must_use]
    pub const fn trigger(&self) -> &TaskGid {
        &self.trigger
    }

    /// Returns the task whose due date was pushed out.
    #[must_use]
    pub const fn affected(&self) -> &TaskGid {
        &self.affected
    }

    /// Returns the due date the affected task held before the extension.
    #[must_use]
    pub const fn original_due_on(&self) -> NaiveDate {
        self.original_due_on
    }
}
