//! Repository port for builds and their tasks.

use crate::version::domain::{Build, BuildId, Task, TaskId, VersionId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for build repository operations.
pub type BuildRepositoryResult<T> = Result<T, BuildRepositoryError>;

/// Build and task persistence contract.
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Stores a build together with its tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRepositoryError::DuplicateBuild`] or
    /// [`BuildRepositoryError::DuplicateTask`] on identifier collisions.
    async fn insert(&self, build: &Build, tasks: &[Task]) -> BuildRepositoryResult<()>;

    /// Deletes a build and its tasks. Deleting a missing build succeeds.
    async fn delete(&self, id: &BuildId) -> BuildRepositoryResult<()>;

    /// Finds a build by identifier.
    async fn find_by_id(&self, id: &BuildId) -> BuildRepositoryResult<Option<Build>>;

    /// Returns the builds of a version.
    async fn find_by_version(&self, version: &VersionId) -> BuildRepositoryResult<Vec<Build>>;

    /// Returns the tasks of a build in creation order.
    async fn find_tasks(&self, build: &BuildId) -> BuildRepositoryResult<Vec<Task>>;

    /// Flags a build and all its tasks activated.
    ///
    /// # Errors
    ///
    /// Returns [`BuildRepositoryError::NotFound`] when the build does not
    /// exist.
    async fn mark_activated(
        &self,
        id: &BuildId,
        activated_at: DateTime<Utc>,
    ) -> BuildRepositoryResult<()>;
}

/// Errors returned by build repository implementations.
#[derive(Debug, Clone, Error)]
pub enum BuildRepositoryError {
    /// A build with the same identifier already exists.
    #[error("duplicate build identifier: {0}")]
    DuplicateBuild(BuildId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The build was not found.
    #[error("build not found: {0}")]
    NotFound(BuildId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl BuildRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
