//! Domain model for priority-driven due-date scheduling.
//!
//! The scheduling domain models task priorities, the due-date policy with
//! its rest-day rule, and the extension records used to reverse due-date
//! perturbations, while keeping all infrastructure concerns outside of the
//! domain boundary.

mod error;
mod event;
mod extension;
mod ids;
pub mod policy;
mod priority;
mod record;

pub use error::{ParsePriorityError, SchedulingDomainError};
pub use event::SectionEvent;
pub use extension::ExtensionRecord;
pub use ids::{ProjectGid, SectionGid, TaskGid};
pub use priority::Priority;
pub use record::TaskRecord;
