//! Shared fixtures for the `PostgreSQL` store tests.

pub use super::cluster::{BoxError, PostgresCluster, postgres_cluster};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use pilotis::{
    project::domain::{ProjectId, ProjectRef},
    tracker::adapters::postgres::PostgresWatermarkRepository,
    version::{
        adapters::postgres::{
            IngestionPgPool, PostgresBuildRepository, PostgresOrderNumberCounter,
            PostgresVersionRepository,
        },
        domain::{
            Build, BuildId, BuildStatus, OrderNumber, Revision, RevisionId, Task, TaskId, Version,
        },
    },
};
use rstest::fixture;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Ingestion schema applied to the template database.
pub const CREATE_INGESTION_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-15-000000_create_ingestion_tables/up.sql");

/// Template database holding the migrated schema.
pub const TEMPLATE_DB: &str = "pilotis_test_template";

/// A fresh database cloned from the template, with every adapter wired to
/// one pool. The database is dropped with the store.
pub struct PreparedStore {
    /// Runtime driving the adapters' blocking tasks.
    pub runtime: Runtime,
    /// Version repository.
    pub versions: Arc<PostgresVersionRepository>,
    /// Build repository.
    pub builds: Arc<PostgresBuildRepository>,
    /// Order-number counter.
    pub counter: Arc<PostgresOrderNumberCounter>,
    /// Watermark repository.
    pub watermarks: Arc<PostgresWatermarkRepository>,
    /// Project the tests ingest for.
    pub project: ProjectRef,
    cluster: PostgresCluster,
    db_name: String,
}

impl PreparedStore {
    fn new(cluster: PostgresCluster) -> Result<Self, BoxError> {
        cluster.ensure_template_exists(TEMPLATE_DB, apply_migrations)?;
        let db_name = format!("test_{}", Uuid::new_v4().simple());
        cluster.create_database_from_template(&db_name, TEMPLATE_DB)?;
        let pool: IngestionPgPool = Pool::builder()
            .max_size(2)
            .build(ConnectionManager::<PgConnection>::new(
                cluster.database_url(&db_name),
            ))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            versions: Arc::new(PostgresVersionRepository::new(pool.clone())),
            builds: Arc::new(PostgresBuildRepository::new(pool.clone())),
            counter: Arc::new(PostgresOrderNumberCounter::new(pool.clone())),
            watermarks: Arc::new(PostgresWatermarkRepository::new(pool)),
            project: ProjectRef::new(ProjectId::new("pilotis")?),
            cluster,
            db_name,
        })
    }

    /// Runs `future` to completion on the store's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Version shell for `revision` at `order`.
    #[must_use]
    pub fn version(&self, revision: &str, order: u64) -> Version {
        Version::from_revision(
            &self.project,
            &commit(revision, 0),
            OrderNumber::new(order).expect("order numbers start at one"),
        )
    }

    /// Version for `revision` with one pending build per `(variant, minutes)`
    /// entry, due `minutes` after [`epoch`].
    #[must_use]
    pub fn version_with_builds(
        &self,
        revision: &str,
        order: u64,
        variants: &[(&str, i64)],
    ) -> Version {
        let mut version = self.version(revision, order);
        for (variant, minutes) in variants {
            version.record_build(BuildStatus::pending(
                *variant,
                BuildId::generate(&self.project.identifier, variant, version.revision(), epoch()),
                epoch() + TimeDelta::minutes(*minutes),
            ));
        }
        version
    }

    /// Build of `variant` for `version`, with one task per entry of `tasks`.
    #[must_use]
    pub fn build(&self, version: &Version, variant: &str, tasks: &[&str]) -> (Build, Vec<Task>) {
        let build_id =
            BuildId::generate(&self.project.identifier, variant, version.revision(), epoch());
        let tasks: Vec<Task> = tasks
            .iter()
            .map(|name| Task {
                id: TaskId::generate(
                    &self.project.identifier,
                    variant,
                    name,
                    version.revision(),
                    epoch(),
                ),
                build_id: build_id.clone(),
                version_id: version.id().clone(),
                project_id: self.project.identifier.clone(),
                build_variant: variant.to_owned(),
                display_name: (*name).to_owned(),
                revision: version.revision().clone(),
                depends_on: Vec::new(),
                activated: false,
                created_at: epoch(),
            })
            .collect();
        let build = Build {
            id: build_id,
            version_id: version.id().clone(),
            project_id: self.project.identifier.clone(),
            build_variant: variant.to_owned(),
            display_name: variant.to_owned(),
            revision: version.revision().clone(),
            order_number: version.order_number(),
            task_ids: tasks.iter().map(|task| task.id.clone()).collect(),
            activated: false,
            activate_at: epoch(),
            created_at: epoch(),
        };
        (build, tasks)
    }
}

impl Drop for PreparedStore {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.db_name));
    }
}

fn apply_migrations(url: &str) -> Result<(), BoxError> {
    let mut conn = PgConnection::establish(url)?;
    conn.batch_execute(CREATE_INGESTION_TABLES_SQL)?;
    Ok(())
}

/// Provides a migrated store, or `None` when no cluster is available.
#[fixture]
pub fn store(postgres_cluster: Option<PostgresCluster>) -> Option<PreparedStore> {
    let cluster = postgres_cluster?;
    Some(PreparedStore::new(cluster).expect("store setup"))
}

/// Fixed time base for stored records.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
        .single()
        .expect("fixed timestamp should be valid")
}

/// Parses a revision identifier.
#[must_use]
pub fn revision_id(id: &str) -> RevisionId {
    RevisionId::new(id).expect("valid revision id")
}

/// Revision committed `minutes` after [`epoch`].
#[must_use]
pub fn commit(id: &str, minutes: i64) -> Revision {
    Revision::new(
        revision_id(id),
        "Ada Lovelace",
        "ada@example.com",
        format!("change {id}"),
        epoch() + TimeDelta::minutes(minutes),
    )
}
