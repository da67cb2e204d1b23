//! In-memory build and task repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::version::{
    domain::{Build, BuildId, Task, TaskId, VersionId},
    ports::{BuildRepository, BuildRepositoryError, BuildRepositoryResult},
};

/// Thread-safe in-memory build repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBuildRepository {
    state: Arc<RwLock<InMemoryBuildState>>,
}

#[derive(Debug, Default)]
struct InMemoryBuildState {
    builds: HashMap<BuildId, Build>,
    tasks: HashMap<TaskId, Task>,
    deleted: Vec<BuildId>,
}

impl InMemoryBuildRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> BuildRepositoryResult<RwLockReadGuard<'_, InMemoryBuildState>> {
        self.state
            .read()
            .map_err(|err| BuildRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> BuildRepositoryResult<RwLockWriteGuard<'_, InMemoryBuildState>> {
        self.state
            .write()
            .map_err(|err| BuildRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    /// Returns the number of stored builds.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn build_count(&self) -> BuildRepositoryResult<usize> {
        Ok(self.read_state()?.builds.len())
    }

    /// Returns the number of stored tasks.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn task_count(&self) -> BuildRepositoryResult<usize> {
        Ok(self.read_state()?.tasks.len())
    }

    /// Returns the identifiers of deleted builds in deletion order.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn deleted_builds(&self) -> BuildRepositoryResult<Vec<BuildId>> {
        Ok(self.read_state()?.deleted.clone())
    }
}

#[async_trait]
impl BuildRepository for InMemoryBuildRepository {
    async fn insert(&self, build: &Build, tasks: &[Task]) -> BuildRepositoryResult<()> {
        let mut state = self.write_state()?;
        if state.builds.contains_key(&build.id) {
            return Err(BuildRepositoryError::DuplicateBuild(build.id.clone()));
        }
        if let Some(task) = tasks.iter().find(|task| state.tasks.contains_key(&task.id)) {
            return Err(BuildRepositoryError::DuplicateTask(task.id.clone()));
        }

        for task in tasks {
            state.tasks.insert(task.id.clone(), task.clone());
        }
        state.builds.insert(build.id.clone(), build.clone());
        Ok(())
    }

    async fn delete(&self, id: &BuildId) -> BuildRepositoryResult<()> {
        let mut state = self.write_state()?;
        if let Some(build) = state.builds.remove(id) {
            for task_id in &build.task_ids {
                state.tasks.remove(task_id);
            }
            state.deleted.push(build.id);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &BuildId) -> BuildRepositoryResult<Option<Build>> {
        Ok(self.read_state()?.builds.get(id).cloned())
    }

    async fn find_by_version(&self, version: &VersionId) -> BuildRepositoryResult<Vec<Build>> {
        let state = self.read_state()?;
        let mut builds: Vec<Build> = state
            .builds
            .values()
            .filter(|build| build.version_id == *version)
            .cloned()
            .collect();
        builds.sort_by(|left, right| left.build_variant.cmp(&right.build_variant));
        Ok(builds)
    }

    async fn find_tasks(&self, build: &BuildId) -> BuildRepositoryResult<Vec<Task>> {
        let state = self.read_state()?;
        let Some(stored) = state.builds.get(build) else {
            return Ok(Vec::new());
        };
        Ok(stored
            .task_ids
            .iter()
            .filter_map(|task_id| state.tasks.get(task_id).cloned())
            .collect())
    }

    async fn mark_activated(
        &self,
        id: &BuildId,
        _activated_at: DateTime<Utc>,
    ) -> BuildRepositoryResult<()> {
        let mut state = self.write_state()?;
        let task_ids = {
            let build = state
                .builds
                .get_mut(id)
                .ok_or_else(|| BuildRepositoryError::NotFound(id.clone()))?;
            build.activated = true;
            build.task_ids.clone()
        };
        for task_id in &task_ids {
            if let Some(task) = state.tasks.get_mut(task_id) {
                task.activated = true;
            }
        }
        Ok(())
    }
}
