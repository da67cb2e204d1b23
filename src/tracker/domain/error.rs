//! Error types for tracker domain values.

use thiserror::Error;

/// Errors returned while loading tracker settings.
#[derive(Debug, Error)]
pub enum TrackerSettingsError {
    /// The settings document is malformed.
    #[error("invalid tracker settings: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
