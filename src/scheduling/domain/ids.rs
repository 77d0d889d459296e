//! Identifier types for externally-owned scheduling entities.
//!
//! The external service assigns opaque string identifiers ("gids") to tasks,
//! sections, and projects. These newtypes keep the three spaces from being
//! mixed up at call sites.

use super::SchedulingDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn validated_gid(raw: &str) -> Option<String> {
    let normalized = raw.trim();
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return None;
    }
    Some(normalized.to_owned())
}

/// Identifier of a task in the external task store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskGid(String);

impl TaskGid {
    /// Creates a validated task identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::InvalidTaskGid`] when the value is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let raw = value.into();
        validated_gid(&raw)
            .map(Self)
            .ok_or(SchedulingDomainError::InvalidTaskGid(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskGid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a section in the external task store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionGid(String);

impl SectionGid {
    /// Creates a validated section identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::InvalidSectionGid`] when the value is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let raw = value.into();
        validated_gid(&raw)
            .map(Self)
            .ok_or(SchedulingDomainError::InvalidSectionGid(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SectionGid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SectionGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a project in the external task store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectGid(String);

impl ProjectGid {
    /// Creates a validated project identifier.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::InvalidProjectGid`] when the value is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let raw = value.into();
        validated_gid(&raw)
            .map(Self)
            .ok_or(SchedulingDomainError::InvalidProjectGid(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProjectGid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProjectGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
