//! Error types for scheduling domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain scheduling values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingDomainError {
    /// The external task identifier is empty or contains whitespace.
    #[error("invalid task gid '{0}', expected a non-empty identifier")]
    InvalidTaskGid(String),

    /// The external section identifier is empty or contains whitespace.
    #[error("invalid section gid '{0}', expected a non-empty identifier")]
    InvalidSectionGid(String),

    /// The external project identifier is empty or contains whitespace.
    #[error("invalid project gid '{0}', expected a non-empty identifier")]
    InvalidProjectGid(String),
}

/// Error returned while strictly parsing priority values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority value: {0}")]
pub struct ParsePriorityError(pub String);
