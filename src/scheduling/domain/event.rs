//! Engine-facing events distilled from inbound change notifications.

use super::TaskGid;

/// A membership or priority change the automation engine reacts to.
///
/// Inbound transports (webhook payloads today) decode their wire formats
/// into this type; the engine never sees raw notification payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEvent {
    /// A task was added to the tracked section.
    Entered(TaskGid),
    /// A task was removed from the tracked section.
    Left(TaskGid),
    /// A task's priority field changed.
    PriorityChanged(TaskGid),
}

impl SectionEvent {
    /// Returns the task the event concerns.
    #[must_use]
    pub const fn task(&self) -> &TaskGid {
        match self {
            Self::Entered(task) | Self::Left(task) | Self::PriorityChanged(task) => task,
        }
    }
}
