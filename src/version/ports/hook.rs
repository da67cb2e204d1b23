//! Notification hook invoked once a version is fully expanded.

use crate::project::domain::ProjectRef;
use crate::version::domain::Version;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Receives fully expanded versions.
///
/// Failures are reported to the caller for logging and never undo the
/// version.
#[async_trait]
pub trait VersionCreatedHook: Send + Sync {
    /// Handles a newly expanded version.
    ///
    /// # Errors
    ///
    /// Returns [`VersionHookError`] when the hook could not complete.
    async fn version_created(
        &self,
        version: &Version,
        project: &ProjectRef,
    ) -> Result<(), VersionHookError>;
}

/// Failure reported by a version hook.
#[derive(Debug, Clone, Error)]
#[error("version hook failed: {0}")]
pub struct VersionHookError(Arc<dyn std::error::Error + Send + Sync>);

impl VersionHookError {
    /// Wraps the hook's underlying failure.
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
