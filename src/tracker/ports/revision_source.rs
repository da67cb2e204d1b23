//! Revision source port: reads revision history from version control.

use crate::project::domain::ProjectRef;
use crate::version::domain::{Revision, RevisionId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for revision source operations.
pub type RevisionSourceResult<T> = Result<T, RevisionSourceError>;

/// Read-only access to a project's revision history.
///
/// Revision lists are returned newest first.
#[async_trait]
pub trait RevisionSource: Send + Sync {
    /// Returns up to `limit` of the newest revisions on the tracked branch.
    async fn recent_revisions(
        &self,
        project: &ProjectRef,
        limit: u32,
    ) -> RevisionSourceResult<Vec<Revision>>;

    /// Returns revisions newer than `since`, searching at most `max_depth`
    /// revisions back from the branch head.
    ///
    /// When `since` is not within the searched range every searched revision
    /// is returned.
    async fn revisions_since(
        &self,
        project: &ProjectRef,
        since: &RevisionId,
        max_depth: u32,
    ) -> RevisionSourceResult<Vec<Revision>>;

    /// Returns the paths changed by `revision`.
    async fn changed_files(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> RevisionSourceResult<Vec<String>>;
}

/// Errors returned by revision sources.
#[derive(Debug, Clone, Error)]
pub enum RevisionSourceError {
    /// The revision is unknown to the hosting service.
    #[error("unknown revision {0}")]
    UnknownRevision(RevisionId),

    /// The hosting service could not be reached.
    #[error("revision fetch failed: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl RevisionSourceError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
