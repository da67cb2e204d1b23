//! Error types for project domain validation and configuration parsing.

use thiserror::Error;

/// Errors returned while constructing project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project identifier is empty or contains whitespace.
    #[error("invalid project identifier '{0}'")]
    InvalidProjectId(String),

    /// An ignore rule is not a valid glob pattern.
    #[error("invalid ignore pattern '{pattern}': {reason}")]
    InvalidIgnorePattern {
        /// Pattern as written in the configuration.
        pattern: String,
        /// Parser explanation.
        reason: String,
    },
}

/// Errors returned while parsing a project configuration document.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    /// The document is not valid YAML or does not match the schema.
    #[error("malformed project configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document's top level is not a mapping.
    #[error("project configuration must be a mapping at the top level")]
    NotAMapping,
}
