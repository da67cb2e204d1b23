//! Tracker polling settings.

use super::TrackerSettingsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Revisions fetched on the first run for a project.
pub const DEFAULT_NUM_NEW_REVISIONS: u32 = 200;

/// Search depth when looking for revisions newer than the watermark.
pub const DEFAULT_MAX_REVISIONS_TO_SEARCH: u32 = 50;

/// Upper bound on any single external fetch.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Settings controlling how far the tracker looks and how long it waits.
///
/// Zero counts fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Revisions fetched when no watermark exists yet.
    pub num_new_revisions: u32,
    /// Maximum revisions searched past the watermark.
    pub max_revisions_to_search: u32,
    /// Timeout applied to each external fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            num_new_revisions: DEFAULT_NUM_NEW_REVISIONS,
            max_revisions_to_search: DEFAULT_MAX_REVISIONS_TO_SEARCH,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl TrackerSettings {
    /// Parses settings from a YAML document, filling absent keys with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerSettingsError::Yaml`] when the document is malformed.
    pub fn from_yaml_str(raw: &str) -> Result<Self, TrackerSettingsError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Settings for tests: short timeouts and small batches.
    #[must_use]
    pub const fn quick() -> Self {
        Self {
            num_new_revisions: 10,
            max_revisions_to_search: 10,
            fetch_timeout_secs: 1,
        }
    }

    /// Effective cold-start revision count.
    #[must_use]
    pub const fn num_new_revisions(&self) -> u32 {
        if self.num_new_revisions == 0 {
            DEFAULT_NUM_NEW_REVISIONS
        } else {
            self.num_new_revisions
        }
    }

    /// Effective search depth past the watermark.
    #[must_use]
    pub const fn max_revisions_to_search(&self) -> u32 {
        if self.max_revisions_to_search == 0 {
            DEFAULT_MAX_REVISIONS_TO_SEARCH
        } else {
            self.max_revisions_to_search
        }
    }

    /// Effective per-fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        if self.fetch_timeout_secs == 0 {
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
        } else {
            Duration::from_secs(self.fetch_timeout_secs)
        }
    }
}
