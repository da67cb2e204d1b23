//! Shared world state for revision ingestion BDD scenarios.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::DefaultClock;
use pilotis::{
    project::{
        adapters::InMemoryConfigSource,
        domain::{ProjectId, ProjectRef},
        services::ConfigResolver,
    },
    tracker::{
        adapters::memory::{InMemoryRevisionSource, InMemoryWatermarkRepository},
        domain::{TrackerRunReport, TrackerSettings},
        services::{RepoTracker, RepoTrackerError},
    },
    version::{
        adapters::memory::{
            InMemoryBuildRepository, InMemoryOrderNumberCounter, InMemoryVersionRepository,
        },
        domain::{Revision, RevisionId, Version},
        services::{IngestionStore, ProjectActivator, VersionBuilder},
    },
};
use rstest::fixture;

/// Configuration served for every revision unless a scenario overrides it.
pub const CONFIG: &str = "\
buildvariants:
  - name: linux-64
    batchtime: 60
    tasks:
      - name: compile
      - name: test
  - name: windows
    tasks:
      - name: compile
  - name: solaris
    disabled: true
    tasks:
      - name: compile
tasks:
  - name: compile
  - name: test
    depends_on:
      - name: compile
ignore:
  - \"docs/**\"
";

/// Tracker type used by the BDD world.
pub type TestTracker = RepoTracker<
    InMemoryVersionRepository,
    InMemoryBuildRepository,
    InMemoryOrderNumberCounter,
    DefaultClock,
>;

/// Scenario world for revision ingestion behaviour tests.
pub struct IngestionWorld {
    pub versions: Arc<InMemoryVersionRepository>,
    pub builds: Arc<InMemoryBuildRepository>,
    pub counter: Arc<InMemoryOrderNumberCounter>,
    pub configs: Arc<InMemoryConfigSource>,
    pub revisions: Arc<InMemoryRevisionSource>,
    pub watermarks: Arc<InMemoryWatermarkRepository>,
    pub project: Option<ProjectRef>,
    pub pushed: i64,
    pub last_run: Option<Result<TrackerRunReport, RepoTrackerError>>,
}

impl IngestionWorld {
    /// Creates a world with empty stores and no project.
    #[must_use]
    pub fn new() -> Self {
        Self {
            versions: Arc::new(InMemoryVersionRepository::new()),
            builds: Arc::new(InMemoryBuildRepository::new()),
            counter: Arc::new(InMemoryOrderNumberCounter::new()),
            configs: Arc::new(InMemoryConfigSource::new()),
            revisions: Arc::new(InMemoryRevisionSource::new()),
            watermarks: Arc::new(InMemoryWatermarkRepository::new()),
            project: None,
            pushed: 0,
            last_run: None,
        }
    }

    /// Returns the tracked project.
    pub fn project(&self) -> Result<&ProjectRef, eyre::Report> {
        self.project
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing tracked project in scenario world"))
    }

    /// Builds a tracker over the world's stores.
    pub fn tracker(&self) -> TestTracker {
        let builder = VersionBuilder::new(
            IngestionStore::new(
                Arc::clone(&self.versions),
                Arc::clone(&self.builds),
                Arc::clone(&self.counter),
            ),
            ConfigResolver::new(self.configs.clone()),
            self.revisions.clone(),
            Arc::new(DefaultClock),
        );
        RepoTracker::new(
            builder,
            ProjectActivator::new(
                Arc::clone(&self.versions),
                Arc::clone(&self.builds),
                Arc::new(DefaultClock),
            ),
            self.revisions.clone(),
            self.watermarks.clone(),
            Arc::new(DefaultClock),
        )
        .with_settings(TrackerSettings::quick())
    }

    /// Returns the project's stored versions in order-number order.
    pub fn stored_versions(&self) -> Result<Vec<Version>, eyre::Report> {
        let project = self.project()?;
        Ok(self.versions.versions_for(&project.identifier)?)
    }

    /// Returns the stored version of revision `id`.
    pub fn version(&self, id: &str) -> Result<Version, eyre::Report> {
        self.stored_versions()?
            .into_iter()
            .find(|version| version.revision().as_str() == id)
            .ok_or_else(|| eyre::eyre!("no version stored for revision {id}"))
    }
}

impl Default for IngestionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> IngestionWorld {
    IngestionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a revision identifier from scenario text.
pub fn revision_id(id: &str) -> Result<RevisionId, eyre::Report> {
    Ok(RevisionId::new(id)?)
}

/// Builds a revision committed `minutes` after a fixed base time.
pub fn revision(id: &str, minutes: i64) -> Result<Revision, eyre::Report> {
    let base = DateTime::parse_from_rfc3339("2026-10-01T09:30:00Z")?.with_timezone(&Utc);
    Ok(Revision::new(
        revision_id(id)?,
        "Grace Hopper",
        "grace@example.com",
        format!("change {id}"),
        base + TimeDelta::minutes(minutes),
    ))
}

/// Splits a comma-separated scenario list.
pub fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// Parses a project identifier from scenario text.
pub fn project_id(id: &str) -> Result<ProjectId, eyre::Report> {
    Ok(ProjectId::new(id)?)
}
