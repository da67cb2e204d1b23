//! In-memory watermark repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::RepositoryWatermark,
    ports::{WatermarkRepository, WatermarkRepositoryError, WatermarkRepositoryResult},
};

/// Thread-safe in-memory watermark repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWatermarkRepository {
    state: Arc<RwLock<InMemoryWatermarkState>>,
}

#[derive(Debug, Default)]
struct InMemoryWatermarkState {
    watermarks: HashMap<ProjectId, RepositoryWatermark>,
    fail_advance: bool,
}

impl InMemoryWatermarkRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every advance fail until reset.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn fail_advances(&self, fail: bool) -> WatermarkRepositoryResult<()> {
        self.state
            .write()
            .map_err(|err| WatermarkRepositoryError::persistence(std::io::Error::other(err.to_string())))?
            .fail_advance = fail;
        Ok(())
    }
}

#[async_trait]
impl WatermarkRepository for InMemoryWatermarkRepository {
    async fn find(
        &self,
        project: &ProjectId,
    ) -> WatermarkRepositoryResult<Option<RepositoryWatermark>> {
        let state = self.state.read().map_err(|err| {
            WatermarkRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.watermarks.get(project).cloned())
    }

    async fn advance(&self, watermark: &RepositoryWatermark) -> WatermarkRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            WatermarkRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.fail_advance {
            return Err(WatermarkRepositoryError::persistence(std::io::Error::other(
                "watermark store unavailable",
            )));
        }
        state
            .watermarks
            .insert(watermark.project_id.clone(), watermark.clone());
        Ok(())
    }
}
