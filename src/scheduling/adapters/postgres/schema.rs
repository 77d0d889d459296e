//! Diesel schema for extension-ledger persistence.

diesel::table! {
    /// Extension records keyed by trigger and affected task.
    task_extensions (trigger_task_gid, affected_task_gid) {
        /// High-priority task whose section entry caused the extension.
        #[max_length = 255]
        trigger_task_gid -> Varchar,
        /// Task whose due date was pushed out.
        #[max_length = 255]
        affected_task_gid -> Varchar,
        /// Due date the affected task held before the extension.
        original_due_on -> Date,
    }
}
