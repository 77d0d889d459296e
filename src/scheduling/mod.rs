//! Priority-driven due-date scheduling for externally-owned tasks.
//!
//! This module implements the automation core: the due-date policy with its
//! rest-day rule, the extension ledger that remembers perturbed due dates,
//! and the engine that reacts to tracked-section membership changes. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
