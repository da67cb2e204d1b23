//! In-memory version repository for ingestion tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::project::domain::ProjectId;
use crate::version::{
    domain::{OrderNumber, RevisionId, Version, VersionId},
    ports::{VersionRepository, VersionRepositoryError, VersionRepositoryResult},
};

/// Thread-safe in-memory version repository.
///
/// Enforces the same uniqueness rules as the relational schema and can be
/// primed to fail the next insert, which exercises rollback paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVersionRepository {
    state: Arc<RwLock<InMemoryVersionState>>,
}

#[derive(Debug, Default)]
struct InMemoryVersionState {
    versions: HashMap<VersionId, Version>,
    revision_index: HashMap<(ProjectId, RevisionId), VersionId>,
    order_index: HashMap<(ProjectId, OrderNumber), VersionId>,
    pending_failure: Option<VersionRepositoryError>,
    inserts: usize,
}

impl InMemoryVersionRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> VersionRepositoryResult<RwLockReadGuard<'_, InMemoryVersionState>> {
        self.state
            .read()
            .map_err(|err| VersionRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> VersionRepositoryResult<RwLockWriteGuard<'_, InMemoryVersionState>> {
        self.state
            .write()
            .map_err(|err| VersionRepositoryError::persistence(std::io::Error::other(err.to_string())))
    }

    /// Fails the next insert with `error` instead of storing the version.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn inject_insert_failure(&self, error: VersionRepositoryError) -> VersionRepositoryResult<()> {
        self.write_state()?.pending_failure = Some(error);
        Ok(())
    }

    /// Returns the number of versions successfully inserted.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn insert_count(&self) -> VersionRepositoryResult<usize> {
        Ok(self.read_state()?.inserts)
    }

    /// Returns every stored version of `project` in order-number order.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn versions_for(&self, project: &ProjectId) -> VersionRepositoryResult<Vec<Version>> {
        let state = self.read_state()?;
        let mut versions: Vec<Version> = state
            .versions
            .values()
            .filter(|version| version.project_id() == project)
            .cloned()
            .collect();
        versions.sort_by_key(Version::order_number);
        Ok(versions)
    }
}

fn project_versions<'a>(
    state: &'a InMemoryVersionState,
    project: &'a ProjectId,
) -> impl Iterator<Item = &'a Version> {
    state
        .versions
        .values()
        .filter(move |version| version.project_id() == project)
}

#[async_trait]
impl VersionRepository for InMemoryVersionRepository {
    async fn insert(&self, version: &Version) -> VersionRepositoryResult<()> {
        let mut state = self.write_state()?;
        if let Some(error) = state.pending_failure.take() {
            return Err(error);
        }
        if state.versions.contains_key(version.id()) {
            return Err(VersionRepositoryError::DuplicateVersion(version.id().clone()));
        }

        let revision_key = (version.project_id().clone(), version.revision().clone());
        if state.revision_index.contains_key(&revision_key) {
            return Err(VersionRepositoryError::DuplicateRevision {
                project: revision_key.0,
                revision: revision_key.1,
            });
        }
        let order_key = (version.project_id().clone(), version.order_number());
        if state.order_index.contains_key(&order_key) {
            return Err(VersionRepositoryError::DuplicateOrderNumber {
                project: order_key.0,
                order_number: order_key.1,
            });
        }

        state.revision_index.insert(revision_key, version.id().clone());
        state.order_index.insert(order_key, version.id().clone());
        state.versions.insert(version.id().clone(), version.clone());
        state.inserts = state.inserts.saturating_add(1);
        Ok(())
    }

    async fn find_by_id(&self, id: &VersionId) -> VersionRepositoryResult<Option<Version>> {
        Ok(self.read_state()?.versions.get(id).cloned())
    }

    async fn find_by_project_and_revision(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
    ) -> VersionRepositoryResult<Option<Version>> {
        let state = self.read_state()?;
        let key = (project.clone(), revision.clone());
        Ok(state
            .revision_index
            .get(&key)
            .and_then(|id| state.versions.get(id))
            .cloned())
    }

    async fn find_latest(&self, project: &ProjectId) -> VersionRepositoryResult<Option<Version>> {
        let state = self.read_state()?;
        Ok(project_versions(&state, project)
            .max_by_key(|version| version.order_number())
            .cloned())
    }

    async fn find_last_variant_activation(
        &self,
        project: &ProjectId,
        build_variant: &str,
    ) -> VersionRepositoryResult<Option<Version>> {
        let state = self.read_state()?;
        Ok(project_versions(&state, project)
            .filter(|version| {
                version
                    .build_status(build_variant)
                    .is_some_and(|status| status.activated)
            })
            .max_by_key(|version| version.order_number())
            .cloned())
    }

    async fn find_pending_activation(
        &self,
        project: &ProjectId,
        due_by: DateTime<Utc>,
    ) -> VersionRepositoryResult<Vec<Version>> {
        let state = self.read_state()?;
        let mut pending: Vec<Version> = project_versions(&state, project)
            .filter(|version| !version.is_ignored())
            .filter(|version| {
                version
                    .build_statuses()
                    .iter()
                    .any(|status| status.is_due(due_by))
            })
            .cloned()
            .collect();
        pending.sort_by_key(|version| std::cmp::Reverse(version.order_number()));
        Ok(pending)
    }

    async fn mark_variant_activated(
        &self,
        id: &VersionId,
        build_variant: &str,
        activated_at: DateTime<Utc>,
    ) -> VersionRepositoryResult<()> {
        let mut state = self.write_state()?;
        let version = state
            .versions
            .get_mut(id)
            .ok_or_else(|| VersionRepositoryError::NotFound(id.clone()))?;
        if version.mark_variant_activated(build_variant, activated_at) {
            Ok(())
        } else {
            Err(VersionRepositoryError::NotFound(id.clone()))
        }
    }
}
