//! Service resolving a project's configuration at a revision.

use crate::project::{
    domain::{
        ConfigDiagnostics, ConfigParseError, ParsedProjectConfig, ProjectConfig, ProjectId,
        ProjectRef,
    },
    ports::{ConfigSource, ConfigSourceError},
};
use crate::tracker::ports::WatermarkRepository;
use crate::version::domain::RevisionId;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// A successfully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Parsed configuration.
    pub config: ProjectConfig,
    /// Non-fatal findings carried into validation.
    pub warnings: Vec<String>,
}

impl From<ParsedProjectConfig> for ResolvedConfig {
    fn from(parsed: ParsedProjectConfig) -> Self {
        Self {
            config: parsed.config,
            warnings: parsed.warnings,
        }
    }
}

/// Classified configuration resolution failure.
#[derive(Debug, Error)]
pub enum ConfigResolutionError {
    /// The revision's configuration is missing or malformed. A stub version
    /// carrying the messages is stored and the batch continues.
    #[error("invalid project configuration: {}", .0.errors.join("; "))]
    Recoverable(ConfigDiagnostics),

    /// The configuration backend failed in a way unrelated to this revision's
    /// file. The batch is aborted.
    #[error("configuration for project {project} at revision {revision} unavailable: {source}")]
    Source {
        /// Project identifier.
        project: ProjectId,
        /// Revision being resolved.
        revision: RevisionId,
        /// Backend failure.
        #[source]
        source: ConfigSourceError,
    },

    /// The local configuration snapshot does not parse. The batch is aborted.
    #[error("local configuration for project {project} is invalid: {source}")]
    LocalParse {
        /// Project identifier.
        project: ProjectId,
        /// Parse failure.
        #[source]
        source: ConfigParseError,
    },
}

impl ConfigResolutionError {
    /// Returns `true` for failures that must abort the batch.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::Recoverable(_))
    }
}

/// Resolves project configuration from a local snapshot or a remote file.
#[derive(Clone)]
pub struct ConfigResolver {
    source: Arc<dyn ConfigSource>,
    watermarks: Option<Arc<dyn WatermarkRepository>>,
}

impl ConfigResolver {
    /// Creates a resolver over a configuration backend.
    #[must_use]
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        Self {
            source,
            watermarks: None,
        }
    }

    /// Uses `watermarks` to report the last known-good revision when a
    /// fatal failure is logged.
    #[must_use]
    pub fn with_watermarks(mut self, watermarks: Arc<dyn WatermarkRepository>) -> Self {
        self.watermarks = Some(watermarks);
        self
    }

    /// Resolves the configuration of `project` at `revision`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigResolutionError::Recoverable`] when the file is
    /// missing, malformed or rejected, and a fatal variant for
    /// infrastructural failures.
    pub async fn resolve(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> Result<ResolvedConfig, ConfigResolutionError> {
        if project.local_config.is_some() {
            return self.resolve_local(project, revision).await;
        }

        match self.source.remote_config(project, revision).await {
            Ok(raw) => ProjectConfig::from_yaml(&raw)
                .map(ResolvedConfig::from)
                .map_err(|err| recoverable(project, revision, &err)),
            Err(err) if err.is_recoverable() => Err(recoverable(project, revision, &err)),
            Err(err) => {
                self.log_fatal(project, revision, &err).await;
                Err(ConfigResolutionError::Source {
                    project: project.identifier.clone(),
                    revision: revision.clone(),
                    source: err,
                })
            }
        }
    }

    async fn resolve_local(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> Result<ResolvedConfig, ConfigResolutionError> {
        let raw = match self.source.local_config(project).await {
            Ok(raw) => raw,
            Err(err) => {
                self.log_fatal(project, revision, &err).await;
                return Err(ConfigResolutionError::Source {
                    project: project.identifier.clone(),
                    revision: revision.clone(),
                    source: err,
                });
            }
        };
        match ProjectConfig::from_yaml(&raw) {
            Ok(parsed) => Ok(ResolvedConfig::from(parsed)),
            Err(err) => {
                self.log_fatal(project, revision, &err).await;
                Err(ConfigResolutionError::LocalParse {
                    project: project.identifier.clone(),
                    source: err,
                })
            }
        }
    }

    async fn log_fatal(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
        err: &(dyn Display + Sync),
    ) {
        let last_revision = self.last_known_revision(&project.identifier).await;
        tracing::error!(
            project = %project.identifier,
            revision = %revision,
            last_revision = last_revision.as_deref().unwrap_or(""),
            error = %err,
            "tracker configuration problem"
        );
    }

    async fn last_known_revision(&self, project: &ProjectId) -> Option<String> {
        let watermarks = self.watermarks.as_ref()?;
        match watermarks.find(project).await {
            Ok(watermark) => watermark.map(|found| found.last_revision.to_string()),
            Err(err) => {
                tracing::error!(project = %project, error = %err, "problem finding repository watermark");
                None
            }
        }
    }
}

fn recoverable(
    project: &ProjectRef,
    revision: &RevisionId,
    cause: &dyn Display,
) -> ConfigResolutionError {
    let message = format!(
        "problem finding project configuration for project '{}' at revision '{}' (path '{}'): {cause}",
        project.identifier,
        revision,
        project.config_path(),
    );
    tracing::error!(
        project = %project.identifier,
        revision = %revision,
        path = project.config_path(),
        error = %cause,
        "problem finding project configuration"
    );
    ConfigResolutionError::Recoverable(ConfigDiagnostics::from_error(message))
}
