//! Typed webhook payloads and their translation into engine events.

use crate::scheduling::domain::{SectionEvent, SectionGid, TaskGid};
use serde::Deserialize;
use thiserror::Error;

/// Fields whose `changed` events are treated as priority changes.
const PRIORITY_FIELDS: [&str; 2] = ["custom_fields", "priority"];

/// Error returned when a syntactically-decoded event is semantically
/// malformed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WebhookDecodeError {
    /// An event referenced a resource with an unusable identifier.
    #[error("invalid event resource: {0}")]
    InvalidResource(String),
}

/// Envelope delivered by the external service: a batch of events.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    /// Events in delivery order.
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// One change notification.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// What happened to the resource.
    pub action: WebhookAction,
    /// The resource the event concerns.
    pub resource: WebhookResource,
    /// Containing resource, present for membership events.
    #[serde(default)]
    pub parent: Option<WebhookResource>,
    /// Field delta, present for `changed` events.
    #[serde(default)]
    pub change: Option<WebhookChange>,
}

/// Action reported for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookAction {
    /// Resource was added to its parent.
    Added,
    /// Resource was removed from its parent.
    Removed,
    /// A field of the resource changed.
    Changed,
    /// Any other action; delivered but irrelevant here.
    #[serde(other)]
    Other,
}

/// Resource reference inside an event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResource {
    /// Identifier of the resource.
    pub gid: String,
    /// Resource type name, when the service includes one.
    #[serde(default)]
    pub resource_type: Option<String>,
}

/// Field delta of a `changed` event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookChange {
    /// Name of the changed field.
    pub field: String,
}

impl WebhookEvent {
    /// Translates the event into an engine-facing [`SectionEvent`].
    ///
    /// Returns `Ok(None)` for events that are well-formed but irrelevant:
    /// membership changes of other sections, changes to other fields, and
    /// unknown actions.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookDecodeError::InvalidResource`] when a relevant
    /// event carries an unusable task identifier.
    pub fn to_section_event(
        &self,
        tracked_section: &SectionGid,
    ) -> Result<Option<SectionEvent>, WebhookDecodeError> {
        match self.action {
            WebhookAction::Added | WebhookAction::Removed => {
                let Some(parent) = &self.parent else {
                    return Ok(None);
                };
                if parent.gid != tracked_section.as_str() {
                    return Ok(None);
                }
                let task = self.task_gid()?;
                if self.action == WebhookAction::Added {
                    Ok(Some(SectionEvent::Entered(task)))
                } else {
                    Ok(Some(SectionEvent::Left(task)))
                }
            }
            WebhookAction::Changed => {
                let Some(change) = &self.change else {
                    return Ok(None);
                };
                if !PRIORITY_FIELDS.contains(&change.field.as_str()) {
                    return Ok(None);
                }
                Ok(Some(SectionEvent::PriorityChanged(self.task_gid()?)))
            }
            WebhookAction::Other => Ok(None),
        }
    }

    fn task_gid(&self) -> Result<TaskGid, WebhookDecodeError> {
        TaskGid::new(self.resource.gid.clone())
            .map_err(|err| WebhookDecodeError::InvalidResource(err.to_string()))
    }
}

/// Translates a whole envelope into engine events, dropping irrelevant
/// entries and rejecting malformed ones.
///
/// # Errors
///
/// Returns the first [`WebhookDecodeError`] encountered; a rejected
/// envelope must not be partially applied.
pub fn section_events(
    envelope: &WebhookEnvelope,
    tracked_section: &SectionGid,
) -> Result<Vec<SectionEvent>, WebhookDecodeError> {
    let mut events = Vec::new();
    for event in &envelope.events {
        if let Some(section_event) = event.to_section_event(tracked_section)? {
            events.push(section_event);
        }
    }
    Ok(events)
}
