//! Diesel row models for extension-ledger persistence.

use super::schema::task_extensions;
use chrono::NaiveDate;
use diesel::prelude::*;

/// Query result row for extension records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_extensions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ExtensionRow {
    /// High-priority task whose section entry caused the extension.
    pub trigger_task_gid: String,
    /// Task whose due date was pushed out.
    pub affected_task_gid: String,
    /// Due date the affected task held before the extension.
    pub original_due_on: NaiveDate,
}

/// Insert model for extension records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_extensions)]
pub struct NewExtensionRow {
    /// High-priority task whose section entry caused the extension.
    pub trigger_task_gid: String,
    /// Task whose due date was pushed out.
    pub affected_task_gid: String,
    /// Due date the affected task held before the extension.
    pub original_due_on: NaiveDate,
}
