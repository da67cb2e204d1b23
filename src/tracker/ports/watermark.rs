//! Watermark repository port.

use crate::project::domain::ProjectId;
use crate::tracker::domain::RepositoryWatermark;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for watermark repository operations.
pub type WatermarkRepositoryResult<T> = Result<T, WatermarkRepositoryError>;

/// Persistence of per-project tracking cursors.
#[async_trait]
pub trait WatermarkRepository: Send + Sync {
    /// Returns the project's watermark, if one was ever recorded.
    async fn find(&self, project: &ProjectId)
    -> WatermarkRepositoryResult<Option<RepositoryWatermark>>;

    /// Creates or moves the project's watermark.
    async fn advance(&self, watermark: &RepositoryWatermark) -> WatermarkRepositoryResult<()>;
}

/// Errors returned by watermark repository implementations.
#[derive(Debug, Clone, Error)]
pub enum WatermarkRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WatermarkRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
