//! Configuration source port: fetches raw project configuration documents.

use crate::project::domain::ProjectRef;
use crate::version::domain::RevisionId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for configuration source operations.
pub type ConfigSourceResult<T> = Result<T, ConfigSourceError>;

/// Backend that produces raw configuration documents.
///
/// Implementations exist per backend (local snapshot, hosted repository);
/// resolution logic depends only on this trait.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetches the configuration file as of `revision`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigSourceError`] classified by failure kind.
    async fn remote_config(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> ConfigSourceResult<String>;

    /// Loads the project's local configuration snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigSourceError`] when the snapshot cannot be read.
    async fn local_config(&self, project: &ProjectRef) -> ConfigSourceResult<String>;
}

/// Errors returned by configuration sources.
#[derive(Debug, Clone, Error)]
pub enum ConfigSourceError {
    /// The file does not exist at the revision. Recoverable.
    #[error("configuration file '{path}' not found at revision {revision}")]
    NotFound {
        /// Repository path searched.
        path: String,
        /// Revision searched.
        revision: RevisionId,
    },

    /// The file exists but its syntax is malformed. Recoverable.
    #[error("malformed configuration file: {0}")]
    Malformed(String),

    /// The hosting API rejected this specific request. Recoverable.
    #[error("configuration request rejected: {0}")]
    Rejected(String),

    /// The hosting API could not be reached or its response not read.
    /// Fatal.
    #[error("configuration transport failure: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),

    /// The hosting API answered with an unexpected envelope or schema.
    /// Fatal.
    #[error("unexpected configuration response: {0}")]
    Schema(String),

    /// The backend does not support the requested kind of fetch. Fatal.
    #[error("unsupported configuration fetch: {0}")]
    Unsupported(String),

    /// The local snapshot could not be read. Fatal.
    #[error("local configuration unavailable: {0}")]
    Local(Arc<dyn std::error::Error + Send + Sync>),
}

impl ConfigSourceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Wraps a local read error.
    pub fn local(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Local(Arc::new(err))
    }

    /// Returns `true` for failures that concern this revision's file rather
    /// than the infrastructure.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Malformed(_) | Self::Rejected(_)
        )
    }
}
