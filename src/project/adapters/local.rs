//! Local filesystem configuration source.

use crate::project::{
    domain::ProjectRef,
    ports::{ConfigSource, ConfigSourceError, ConfigSourceResult},
};
use crate::version::domain::RevisionId;
use async_trait::async_trait;
use cap_std::fs_utf8::Dir;
use std::sync::Arc;

/// Reads local configuration snapshots from a capability-scoped directory.
///
/// Paths in [`ProjectRef::local_config`] are resolved relative to the
/// directory and cannot escape it. Remote fetches are delegated to an
/// optional hosted backend.
#[derive(Clone)]
pub struct LocalFileConfigSource {
    root: Arc<Dir>,
    remote: Option<Arc<dyn ConfigSource>>,
}

impl LocalFileConfigSource {
    /// Creates a source reading snapshots below `root`.
    #[must_use]
    pub fn new(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
            remote: None,
        }
    }

    /// Delegates remote fetches to `remote`.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn ConfigSource>) -> Self {
        self.remote = Some(remote);
        self
    }
}

#[async_trait]
impl ConfigSource for LocalFileConfigSource {
    async fn remote_config(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> ConfigSourceResult<String> {
        match &self.remote {
            Some(remote) => remote.remote_config(project, revision).await,
            None => Err(ConfigSourceError::Unsupported(format!(
                "no remote configuration backend for project {}",
                project.identifier
            ))),
        }
    }

    async fn local_config(&self, project: &ProjectRef) -> ConfigSourceResult<String> {
        let path = project.local_config.clone().ok_or_else(|| {
            ConfigSourceError::Unsupported(format!(
                "project {} has no local configuration path",
                project.identifier
            ))
        })?;
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || root.read_to_string(path.as_str()))
            .await
            .map_err(ConfigSourceError::local)?
            .map_err(ConfigSourceError::local)
    }
}
