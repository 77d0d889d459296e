//! Task priority levels and their parsing rules.

use super::ParsePriorityError;
use serde::{Deserialize, Serialize};

/// Priority level carried by the external service's `Priority` custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Routine work, generous deadline.
    Low,
    /// Ordinary work, the default tempo.
    Medium,
    /// Urgent work, tight deadline.
    High,
}

impl Priority {
    /// Returns the canonical display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Number of days between "now" and the default due date for this level.
    #[must_use]
    pub const fn offset_days(self) -> u64 {
        match self {
            Self::Low => 14,
            Self::Medium => 7,
            Self::High => 2,
        }
    }

    /// Parses a priority value, falling back to [`Priority::Medium`] for
    /// unrecognized names.
    ///
    /// Priority values arrive from an externally-edited enum field, so an
    /// unknown name must never be fatal; the medium tempo is the fallback.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        Self::try_from(value).unwrap_or(Self::Medium)
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            // The external field historically used "Mid" for the middle level.
            "medium" | "mid" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}
