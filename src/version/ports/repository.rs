//! Repository port for version persistence and lookup.

use crate::project::domain::ProjectId;
use crate::version::domain::{OrderNumber, RevisionId, Version, VersionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for version repository operations.
pub type VersionRepositoryResult<T> = Result<T, VersionRepositoryError>;

/// Version persistence contract.
///
/// Implementations must enforce uniqueness of the version identifier, of
/// `(project, revision)` and of `(project, order number)` atomically on
/// insert.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Stores a new version.
    ///
    /// # Errors
    ///
    /// Returns [`VersionRepositoryError::DuplicateVersion`] or
    /// [`VersionRepositoryError::DuplicateRevision`] when the revision is
    /// already stored, and [`VersionRepositoryError::DuplicateOrderNumber`]
    /// when the order number is taken.
    async fn insert(&self, version: &Version) -> VersionRepositoryResult<()>;

    /// Finds a version by identifier.
    async fn find_by_id(&self, id: &VersionId) -> VersionRepositoryResult<Option<Version>>;

    /// Finds the version stored for a project revision.
    async fn find_by_project_and_revision(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
    ) -> VersionRepositoryResult<Option<Version>>;

    /// Finds the version with the highest order number in the project.
    async fn find_latest(&self, project: &ProjectId) -> VersionRepositoryResult<Option<Version>>;

    /// Finds the version with the highest order number whose status for
    /// `build_variant` is activated.
    async fn find_last_variant_activation(
        &self,
        project: &ProjectId,
        build_variant: &str,
    ) -> VersionRepositoryResult<Option<Version>>;

    /// Returns non-ignored versions holding at least one status that is
    /// pending and due by `due_by`, newest first.
    async fn find_pending_activation(
        &self,
        project: &ProjectId,
        due_by: DateTime<Utc>,
    ) -> VersionRepositoryResult<Vec<Version>>;

    /// Marks one variant of a stored version activated.
    ///
    /// # Errors
    ///
    /// Returns [`VersionRepositoryError::NotFound`] when the version does not
    /// exist.
    async fn mark_variant_activated(
        &self,
        id: &VersionId,
        build_variant: &str,
        activated_at: DateTime<Utc>,
    ) -> VersionRepositoryResult<()>;
}

/// Errors returned by version repository implementations.
#[derive(Debug, Clone, Error)]
pub enum VersionRepositoryError {
    /// A version with the same identifier already exists.
    #[error("duplicate version identifier: {0}")]
    DuplicateVersion(VersionId),

    /// A version for the same project revision already exists.
    #[error("project {project} already has a version for revision {revision}")]
    DuplicateRevision {
        /// Project identifier.
        project: ProjectId,
        /// Conflicting revision.
        revision: RevisionId,
    },

    /// The order number is already held by another version of the project.
    #[error("project {project} already has a version with order number {order_number}")]
    DuplicateOrderNumber {
        /// Project identifier.
        project: ProjectId,
        /// Conflicting order number.
        order_number: OrderNumber,
    },

    /// The version was not found.
    #[error("version not found: {0}")]
    NotFound(VersionId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl VersionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns `true` when the insert lost a race for the same revision.
    #[must_use]
    pub const fn is_duplicate_revision(&self) -> bool {
        matches!(
            self,
            Self::DuplicateVersion(_) | Self::DuplicateRevision { .. }
        )
    }
}
