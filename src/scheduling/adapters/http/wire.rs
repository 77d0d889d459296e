//! Wire representations of the external task-store REST dialect.
//!
//! The service wraps every response in a `data` envelope and reports task
//! priority through a custom enum field named `Priority`.

use crate::scheduling::domain::{Priority, TaskGid, TaskRecord};
use crate::scheduling::ports::TaskStoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Name of the custom field carrying the priority level.
const PRIORITY_FIELD: &str = "Priority";

/// Date format used for `due_on` values on the wire.
pub(super) const DUE_ON_FORMAT: &str = "%Y-%m-%d";

/// Response envelope wrapping the payload of interest.
#[derive(Debug, Deserialize)]
pub(super) struct DataEnvelope<T> {
    /// Wrapped payload.
    pub data: T,
}

/// Task resource as returned by the external service.
#[derive(Debug, Deserialize)]
pub(super) struct TaskDto {
    /// Task identifier.
    pub gid: String,
    /// Task name.
    #[serde(default)]
    pub name: String,
    /// Due date in `YYYY-MM-DD` form, when set.
    #[serde(default)]
    pub due_on: Option<String>,
    /// Custom field values, when requested.
    #[serde(default)]
    pub custom_fields: Option<Vec<CustomFieldDto>>,
}

/// Custom field value attached to a task.
#[derive(Debug, Deserialize)]
pub(super) struct CustomFieldDto {
    /// Field name.
    #[serde(default)]
    pub name: Option<String>,
    /// Selected enum option, for enum-typed fields.
    #[serde(default)]
    pub enum_value: Option<EnumValueDto>,
}

/// Selected option of an enum-typed custom field.
#[derive(Debug, Deserialize)]
pub(super) struct EnumValueDto {
    /// Option name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Request body for due-date updates.
#[derive(Debug, Serialize)]
pub(super) struct DueDatePayload {
    /// Request envelope.
    pub data: DueDateData,
}

/// Inner update payload carrying the new due date.
#[derive(Debug, Serialize)]
pub(super) struct DueDateData {
    /// Due date in `YYYY-MM-DD` form.
    pub due_on: String,
}

impl DueDatePayload {
    /// Builds the update body for a due date.
    pub(super) fn for_date(due_on: NaiveDate) -> Self {
        Self {
            data: DueDateData {
                due_on: due_on.format(DUE_ON_FORMAT).to_string(),
            },
        }
    }
}

impl TaskDto {
    /// Converts the wire task into a domain snapshot.
    ///
    /// Identifier and due-date fields must be well-formed; the automation
    /// rules depend on them, so malformed values are decode errors rather
    /// than silent defaults. Unrecognized priority names fall back to the
    /// medium level and an absent priority field stays absent.
    pub(super) fn into_record(self) -> Result<TaskRecord, TaskStoreError> {
        let Self {
            gid,
            name,
            due_on,
            custom_fields,
        } = self;

        let task_gid = TaskGid::new(gid).map_err(|err| TaskStoreError::Decode(err.to_string()))?;
        let mut record = TaskRecord::new(task_gid, name);

        if let Some(raw_due) = due_on {
            let parsed = NaiveDate::parse_from_str(&raw_due, DUE_ON_FORMAT).map_err(|err| {
                TaskStoreError::Decode(format!("invalid due_on '{raw_due}': {err}"))
            })?;
            record = record.with_due_on(parsed);
        }

        if let Some(priority) = priority_from_fields(custom_fields.as_deref()) {
            record = record.with_priority(priority);
        }

        Ok(record)
    }
}

/// Extracts the priority level from a task's custom fields, if present.
fn priority_from_fields(fields: Option<&[CustomFieldDto]>) -> Option<Priority> {
    let fields = fields?;
    let priority_field = fields
        .iter()
        .find(|field| field.name.as_deref() == Some(PRIORITY_FIELD))?;
    let value = priority_field.enum_value.as_ref()?.name.as_deref()?;
    Some(Priority::parse_lenient(value))
}
