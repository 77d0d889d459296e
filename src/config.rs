//! Service settings loaded from a JSON file.
//!
//! The settings file carries the external-service credentials and the
//! project/section the automation watches. The API token may instead be
//! supplied through the `CADENCE_API_TOKEN` environment variable, which
//! takes precedence over the file.

use crate::scheduling::domain::{ProjectGid, SchedulingDomainError, SectionGid};
use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the configured API token.
pub const API_TOKEN_ENV: &str = "CADENCE_API_TOKEN";

const DEFAULT_BASE_URL: &str = "https://app.asana.com/api/1.0";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("could not read settings file '{path}': {source}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON of the expected shape.
    #[error("could not parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configured identifier failed domain validation.
    #[error(transparent)]
    Invalid(#[from] SchedulingDomainError),

    /// Neither the settings file nor the environment supplied an API token.
    #[error("no API token configured; set CADENCE_API_TOKEN or the api_token setting")]
    MissingApiToken,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    #[serde(default)]
    api_token: Option<String>,
    #[serde(default = "default_base_url")]
    base_url: String,
    project_gid: String,
    tracked_section_gid: String,
    #[serde(default = "default_poll_interval_secs")]
    poll_interval_secs: u64,
    #[serde(default = "default_bind_addr")]
    bind_addr: String,
    #[serde(default)]
    database_url: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_owned()
}

/// Validated service settings.
#[derive(Debug, Clone)]
pub struct Settings {
    api_token: String,
    base_url: String,
    project: ProjectGid,
    tracked_section: SectionGid,
    poll_interval: Duration,
    bind_addr: String,
    database_url: Option<String>,
}

impl Settings {
    /// Loads settings from a JSON file, applying the environment token
    /// override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let token_override = env::var(API_TOKEN_ENV).ok();
        Self::from_json_with_token(&bytes, token_override)
    }

    /// Parses settings from JSON bytes without consulting the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bytes cannot be parsed or validated.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        Self::from_json_with_token(bytes, None)
    }

    /// Parses settings from JSON bytes with an explicit token override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the bytes cannot be parsed or validated,
    /// or when neither the override nor the file supplies a token.
    pub fn from_json_with_token(
        bytes: &[u8],
        token_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_slice(bytes)?;
        let api_token = token_override
            .filter(|token| !token.is_empty())
            .or(raw.api_token)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingApiToken)?;

        Ok(Self {
            api_token,
            base_url: raw.base_url.trim_end_matches('/').to_owned(),
            project: ProjectGid::new(raw.project_gid)?,
            tracked_section: SectionGid::new(raw.tracked_section_gid)?,
            poll_interval: Duration::from_secs(raw.poll_interval_secs),
            bind_addr: raw.bind_addr,
            database_url: raw.database_url.filter(|url| !url.is_empty()),
        })
    }

    /// Returns the API token.
    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Returns the task-store API base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the watched project.
    #[must_use]
    pub const fn project(&self) -> &ProjectGid {
        &self.project
    }

    /// Returns the tracked section.
    #[must_use]
    pub const fn tracked_section(&self) -> &SectionGid {
        &self.tracked_section
    }

    /// Returns the polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the webhook server bind address.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Returns the ledger database URL, when one is configured.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}
