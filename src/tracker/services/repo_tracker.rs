//! Orchestrates one polling run for a project.

use crate::interrupt::{Interrupted, interruptible};
use crate::project::domain::ProjectRef;
use crate::tracker::{
    domain::{RepositoryWatermark, SkipReason, TrackerRunReport, TrackerSettings},
    ports::{RevisionSource, WatermarkRepository, WatermarkRepositoryError},
};
use crate::version::{
    domain::Revision,
    ports::{BuildRepository, OrderNumberCounter, VersionRepository},
    services::{ActivationError, ProjectActivator, VersionBuilder, VersionBuilderError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors that abort a tracker run.
///
/// The watermark is left untouched by every variant, so the affected
/// revisions are retried on the next run.
#[derive(Debug, Error)]
pub enum RepoTrackerError {
    /// A revision of the batch could not be stored.
    #[error(transparent)]
    Builder(#[from] VersionBuilderError),
    /// The watermark could not be read or advanced.
    #[error(transparent)]
    Watermark(#[from] WatermarkRepositoryError),
    /// Activation of due builds failed.
    #[error(transparent)]
    Activation(#[from] ActivationError),
    /// The run was cancelled.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Result type for tracker runs.
pub type RepoTrackerResult<T> = Result<T, RepoTrackerError>;

/// Polls a project's revision history and ingests new revisions.
#[derive(Clone)]
pub struct RepoTracker<V, B, O, C>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
    C: Clock + Send + Sync,
{
    builder: VersionBuilder<V, B, O, C>,
    activator: ProjectActivator<V, B, C>,
    revisions: Arc<dyn RevisionSource>,
    watermarks: Arc<dyn WatermarkRepository>,
    clock: Arc<C>,
    settings: TrackerSettings,
}

impl<V, B, O, C> RepoTracker<V, B, O, C>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
    C: Clock + Send + Sync,
{
    /// Creates a tracker with default settings.
    #[must_use]
    pub fn new(
        builder: VersionBuilder<V, B, O, C>,
        activator: ProjectActivator<V, B, C>,
        revisions: Arc<dyn RevisionSource>,
        watermarks: Arc<dyn WatermarkRepository>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            builder,
            activator,
            revisions,
            watermarks,
            clock,
            settings: TrackerSettings::default(),
        }
    }

    /// Replaces the polling settings. The fetch timeout also bounds the
    /// builder's configuration and changed-file fetches.
    #[must_use]
    pub fn with_settings(mut self, settings: TrackerSettings) -> Self {
        self.builder = self.builder.with_fetch_timeout(settings.fetch_timeout());
        self.settings = settings;
        self
    }

    /// Runs one polling pass for `project`.
    ///
    /// Disabled projects, projects with a recorded tracker error and failed
    /// polls end the run successfully with a skip reason. Otherwise new
    /// revisions are stored oldest first, the watermark moves to the newest
    /// one and due builds are activated.
    ///
    /// # Errors
    ///
    /// Returns [`RepoTrackerError`] when a revision cannot be stored, the
    /// watermark cannot be read or advanced, activation fails or the run is
    /// cancelled.
    pub async fn run(
        &self,
        project: &ProjectRef,
        cancel: &CancellationToken,
    ) -> RepoTrackerResult<TrackerRunReport> {
        if !project.enabled {
            tracing::debug!(project = %project.identifier, "tracking disabled, skipping");
            return Ok(TrackerRunReport::skipped(SkipReason::Disabled));
        }

        let watermark = self.watermarks.find(&project.identifier).await?;
        if watermark.is_some() && project.has_tracker_error() {
            tracing::warn!(
                project = %project.identifier,
                "tracker error recorded for project, skipping poll"
            );
            return Ok(TrackerRunReport::skipped(SkipReason::TrackerError));
        }

        let Some(revisions) = self.poll(project, watermark.as_ref(), cancel).await? else {
            return Ok(TrackerRunReport::skipped(SkipReason::PollFailed));
        };

        let mut report = TrackerRunReport {
            revisions_seen: revisions.len(),
            ..TrackerRunReport::default()
        };
        if let Some(head) = revisions.first() {
            let newest = self
                .builder
                .store_revisions(project, &revisions, cancel)
                .await?;
            report.newest_version = newest.map(|version| version.id().clone());
            self.watermarks
                .advance(&RepositoryWatermark::new(
                    project.identifier.clone(),
                    head.id().clone(),
                    self.clock.utc(),
                ))
                .await?;
            tracing::info!(
                project = %project.identifier,
                revision = %head.id(),
                count = revisions.len(),
                "watermark advanced"
            );
            report.advanced_to = Some(head.id().clone());
        }

        report.builds_activated = self.activator.activate(project).await?.len();
        Ok(report)
    }

    /// Fetches new revisions, newest first. Returns `None` when the poll
    /// failed or timed out.
    async fn poll(
        &self,
        project: &ProjectRef,
        watermark: Option<&RepositoryWatermark>,
        cancel: &CancellationToken,
    ) -> RepoTrackerResult<Option<Vec<Revision>>> {
        let timeout = self.settings.fetch_timeout();
        let fetched = match watermark {
            None => {
                let limit = self.settings.num_new_revisions();
                tracing::info!(
                    project = %project.identifier,
                    limit,
                    "no watermark recorded, fetching recent revisions"
                );
                interruptible(
                    cancel,
                    timeout,
                    self.revisions.recent_revisions(project, limit),
                )
                .await
            }
            Some(found) => {
                interruptible(
                    cancel,
                    timeout,
                    self.revisions.revisions_since(
                        project,
                        &found.last_revision,
                        self.settings.max_revisions_to_search(),
                    ),
                )
                .await
            }
        };

        match fetched {
            Ok(Ok(revisions)) => Ok(Some(revisions)),
            Ok(Err(err)) => {
                tracing::error!(
                    project = %project.identifier,
                    error = %err,
                    "problem fetching revisions"
                );
                Ok(None)
            }
            Err(Interrupted::TimedOut(limit)) => {
                tracing::error!(
                    project = %project.identifier,
                    timeout_secs = limit.as_secs(),
                    "timed out fetching revisions"
                );
                Ok(None)
            }
            Err(cancelled @ Interrupted::Cancelled) => Err(cancelled.into()),
        }
    }
}
