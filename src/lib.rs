//! Cadence: priority-driven due-date automation for project-management
//! tasks.
//!
//! Cadence watches one project on an external task-management service and
//! keeps due dates in step with task priorities: high-priority tasks
//! entering the tracked section push sibling deadlines out, leaving it
//! pulls them back to their recorded originals, and every other task gets a
//! default due date derived from its priority. Changes arrive through an
//! inbound webhook and a fallback polling loop.
//!
//! # Architecture
//!
//! Cadence follows hexagonal architecture principles:
//!
//! - **Domain**: Pure scheduling logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the task store and the ledger
//! - **Adapters**: Concrete implementations of ports (REST, database,
//!   memory)
//!
//! # Modules
//!
//! - [`scheduling`]: Due-date policy, extension ledger, automation engine
//! - [`webhook`]: Inbound event decoding and the HTTP edge
//! - [`config`]: Settings file handling
//! - [`poller`]: Fixed-interval cycle driver

pub mod config;
pub mod poller;
pub mod scheduling;
pub mod webhook;
