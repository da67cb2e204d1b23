//! In-memory configuration source for deterministic ingestion flows.

use crate::project::{
    domain::{ProjectId, ProjectRef},
    ports::{ConfigSource, ConfigSourceError, ConfigSourceResult},
};
use crate::version::domain::RevisionId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

/// Scripted outcome for one configuration fetch.
#[derive(Debug, Clone)]
enum ScriptedConfig {
    Document(String),
    Failure(ConfigSourceError),
}

/// Configuration source backed by in-process maps.
///
/// Remote documents are keyed by revision; a project-wide default document
/// answers revisions without an explicit entry. Unscripted revisions behave
/// like a missing file.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigSource {
    state: Arc<RwLock<InMemoryConfigState>>,
}

#[derive(Debug, Default)]
struct InMemoryConfigState {
    by_revision: HashMap<(ProjectId, RevisionId), ScriptedConfig>,
    project_defaults: HashMap<ProjectId, String>,
    local_snapshots: HashMap<ProjectId, String>,
    remote_fetches: usize,
}

impl InMemoryConfigSource {
    /// Creates an empty configuration source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_state(&self) -> ConfigSourceResult<RwLockWriteGuard<'_, InMemoryConfigState>> {
        self.state
            .write()
            .map_err(|err| ConfigSourceError::transport(std::io::Error::other(err.to_string())))
    }

    /// Serves `document` for every revision of the project without an
    /// explicit entry.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_default_document(
        &self,
        project: &ProjectId,
        document: impl Into<String>,
    ) -> ConfigSourceResult<()> {
        self.write_state()?
            .project_defaults
            .insert(project.clone(), document.into());
        Ok(())
    }

    /// Serves `document` for one revision.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_document(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
        document: impl Into<String>,
    ) -> ConfigSourceResult<()> {
        self.write_state()?.by_revision.insert(
            (project.clone(), revision.clone()),
            ScriptedConfig::Document(document.into()),
        );
        Ok(())
    }

    /// Fails the fetch for one revision with `error`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_failure(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
        error: ConfigSourceError,
    ) -> ConfigSourceResult<()> {
        self.write_state()?.by_revision.insert(
            (project.clone(), revision.clone()),
            ScriptedConfig::Failure(error),
        );
        Ok(())
    }

    /// Serves `document` as the project's local snapshot.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn set_local_snapshot(
        &self,
        project: &ProjectId,
        document: impl Into<String>,
    ) -> ConfigSourceResult<()> {
        self.write_state()?
            .local_snapshots
            .insert(project.clone(), document.into());
        Ok(())
    }

    /// Returns the number of remote fetches served so far.
    ///
    /// # Errors
    ///
    /// Returns a transport error when lock acquisition fails.
    pub fn remote_fetch_count(&self) -> ConfigSourceResult<usize> {
        let state = self
            .state
            .read()
            .map_err(|err| ConfigSourceError::transport(std::io::Error::other(err.to_string())))?;
        Ok(state.remote_fetches)
    }
}

#[async_trait]
impl ConfigSource for InMemoryConfigSource {
    async fn remote_config(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> ConfigSourceResult<String> {
        let mut state = self.write_state()?;
        state.remote_fetches = state.remote_fetches.saturating_add(1);

        let key = (project.identifier.clone(), revision.clone());
        match state.by_revision.get(&key) {
            Some(ScriptedConfig::Document(document)) => return Ok(document.clone()),
            Some(ScriptedConfig::Failure(error)) => return Err(error.clone()),
            None => {}
        }

        state
            .project_defaults
            .get(&project.identifier)
            .cloned()
            .ok_or_else(|| ConfigSourceError::NotFound {
                path: project.remote_path.clone(),
                revision: revision.clone(),
            })
    }

    async fn local_config(&self, project: &ProjectRef) -> ConfigSourceResult<String> {
        let state = self
            .state
            .read()
            .map_err(|err| ConfigSourceError::transport(std::io::Error::other(err.to_string())))?;
        state
            .local_snapshots
            .get(&project.identifier)
            .cloned()
            .ok_or_else(|| {
                ConfigSourceError::local(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no local snapshot for project {}", project.identifier),
                ))
            })
    }
}
