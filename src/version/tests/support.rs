//! Shared fixtures for ingestion tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::project::{
    adapters::InMemoryConfigSource,
    domain::{ProjectId, ProjectRef},
    services::ConfigResolver,
};
use crate::tracker::adapters::memory::{InMemoryRevisionSource, InMemoryWatermarkRepository};
use crate::version::{
    adapters::memory::{
        InMemoryBuildRepository, InMemoryOrderNumberCounter, InMemoryVersionRepository,
    },
    domain::{Revision, RevisionId},
    services::{BuildExpander, IngestionStore, ProjectActivator, VersionBuilder},
};

/// Two enabled variants, one disabled, with in-variant and cross-variant
/// dependencies.
pub(crate) const CONFIG: &str = "\
buildvariants:
  - name: linux
    display_name: Linux
    batchtime: 60
    tasks:
      - name: compile
      - name: test
  - name: windows
    tasks:
      - name: compile
      - name: package
  - name: legacy
    disabled: true
    tasks:
      - name: compile
tasks:
  - name: compile
  - name: test
    depends_on:
      - name: compile
  - name: package
    depends_on:
      - name: compile
      - name: test
        variant: linux
";

/// Clock whose time only moves when told to.
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub(crate) fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock lock should not be poisoned");
        *now += TimeDelta::minutes(minutes);
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock should not be poisoned")
    }
}

pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
        .single()
        .expect("fixed timestamp should be valid")
}

pub(crate) fn project() -> ProjectRef {
    ProjectRef::new(ProjectId::new("pilotis").expect("valid project id"))
        .with_repository("pilotis", "pilotis", "main")
}

pub(crate) fn revision_id(id: &str) -> RevisionId {
    RevisionId::new(id).expect("valid revision id")
}

/// Revision committed `minutes` after [`epoch`].
pub(crate) fn revision(id: &str, minutes: i64) -> Revision {
    Revision::new(
        revision_id(id),
        "Ada Lovelace",
        "ada@example.com",
        format!("commit {id}"),
        epoch() + TimeDelta::minutes(minutes),
    )
    .with_author_external_id("ada")
}

pub(crate) type TestBuilder = VersionBuilder<
    InMemoryVersionRepository,
    InMemoryBuildRepository,
    InMemoryOrderNumberCounter,
    ManualClock,
>;
pub(crate) type TestExpander =
    BuildExpander<InMemoryVersionRepository, InMemoryBuildRepository, ManualClock>;
pub(crate) type TestActivator =
    ProjectActivator<InMemoryVersionRepository, InMemoryBuildRepository, ManualClock>;

/// In-memory ingestion stack sharing one set of repositories.
pub(crate) struct Ingestion {
    pub(crate) clock: Arc<ManualClock>,
    pub(crate) versions: Arc<InMemoryVersionRepository>,
    pub(crate) builds: Arc<InMemoryBuildRepository>,
    pub(crate) counter: Arc<InMemoryOrderNumberCounter>,
    pub(crate) configs: Arc<InMemoryConfigSource>,
    pub(crate) revisions: Arc<InMemoryRevisionSource>,
    pub(crate) watermarks: Arc<InMemoryWatermarkRepository>,
    pub(crate) project: ProjectRef,
}

impl Ingestion {
    pub(crate) fn new() -> Self {
        Self {
            clock: Arc::new(ManualClock::at(epoch())),
            versions: Arc::new(InMemoryVersionRepository::new()),
            builds: Arc::new(InMemoryBuildRepository::new()),
            counter: Arc::new(InMemoryOrderNumberCounter::new()),
            configs: Arc::new(InMemoryConfigSource::new()),
            revisions: Arc::new(InMemoryRevisionSource::new()),
            watermarks: Arc::new(InMemoryWatermarkRepository::new()),
            project: project(),
        }
    }

    /// Serves [`CONFIG`] for every revision of the project.
    pub(crate) fn with_default_config(self) -> Self {
        self.configs
            .set_default_document(&self.project.identifier, CONFIG)
            .expect("scripting should succeed");
        self
    }

    /// Adds revisions to the project's history, oldest first.
    pub(crate) fn push_revisions(&self, revisions: &[Revision]) {
        for entry in revisions {
            self.revisions
                .push(&self.project.identifier, entry.clone())
                .expect("scripting should succeed");
        }
    }

    pub(crate) fn resolver(&self) -> ConfigResolver {
        ConfigResolver::new(self.configs.clone()).with_watermarks(self.watermarks.clone())
    }

    pub(crate) fn builder(&self) -> TestBuilder {
        VersionBuilder::new(
            IngestionStore::new(
                Arc::clone(&self.versions),
                Arc::clone(&self.builds),
                Arc::clone(&self.counter),
            ),
            self.resolver(),
            self.revisions.clone(),
            Arc::clone(&self.clock),
        )
    }

    pub(crate) fn expander(&self) -> TestExpander {
        BuildExpander::new(
            Arc::clone(&self.versions),
            Arc::clone(&self.builds),
            Arc::clone(&self.clock),
        )
    }

    pub(crate) fn activator(&self) -> TestActivator {
        ProjectActivator::new(
            Arc::clone(&self.versions),
            Arc::clone(&self.builds),
            Arc::clone(&self.clock),
        )
    }
}
