//! `PostgreSQL` repository implementation for build and task storage.

use super::{
    IngestionPgPool,
    models::{BuildRow, TaskRow},
    schema::{build_tasks, builds},
};
use crate::project::domain::ProjectId;
use crate::version::{
    domain::{Build, BuildId, OrderNumber, RevisionId, Task, TaskId, VersionId},
    ports::{BuildRepository, BuildRepositoryError, BuildRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed build repository.
#[derive(Debug, Clone)]
pub struct PostgresBuildRepository {
    pool: IngestionPgPool,
}

impl PostgresBuildRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IngestionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> BuildRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BuildRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BuildRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BuildRepositoryError::persistence)?
    }
}

impl From<DieselError> for BuildRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl BuildRepository for PostgresBuildRepository {
    async fn insert(&self, build: &Build, tasks: &[Task]) -> BuildRepositoryResult<()> {
        let build_row = to_build_row(build)?;
        let task_rows = tasks
            .iter()
            .enumerate()
            .map(|(position, task)| to_task_row(task, position))
            .collect::<BuildRepositoryResult<Vec<_>>>()?;
        let build_id = build.id.clone();
        let first_task = tasks.first().map(|task| task.id.clone());

        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                diesel::insert_into(builds::table)
                    .values(&build_row)
                    .execute(tx)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            BuildRepositoryError::DuplicateBuild(build_id.clone())
                        }
                        _ => BuildRepositoryError::persistence(err),
                    })?;
                if task_rows.is_empty() {
                    return Ok(());
                }
                diesel::insert_into(build_tasks::table)
                    .values(&task_rows)
                    .execute(tx)
                    .map_err(|err| match (err, first_task.clone()) {
                        (
                            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _),
                            Some(task_id),
                        ) => BuildRepositoryError::DuplicateTask(task_id),
                        (other, _) => BuildRepositoryError::persistence(other),
                    })?;
                Ok(())
            })
        })
        .await
    }

    async fn delete(&self, id: &BuildId) -> BuildRepositoryResult<()> {
        let build_key = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                diesel::delete(build_tasks::table.filter(build_tasks::build_id.eq(build_key.as_str())))
                    .execute(tx)?;
                diesel::delete(builds::table.filter(builds::id.eq(build_key.as_str()))).execute(tx)?;
                Ok(())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: &BuildId) -> BuildRepositoryResult<Option<Build>> {
        let build_key = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = builds::table
                .filter(builds::id.eq(build_key))
                .select(BuildRow::as_select())
                .first::<BuildRow>(connection)
                .optional()?;
            row.map(row_to_build).transpose()
        })
        .await
    }

    async fn find_by_version(&self, version: &VersionId) -> BuildRepositoryResult<Vec<Build>> {
        let version_key = version.as_str().to_owned();
        self.run_blocking(move |connection| {
            builds::table
                .filter(builds::version_id.eq(version_key))
                .order(builds::build_variant.asc())
                .select(BuildRow::as_select())
                .load::<BuildRow>(connection)?
                .into_iter()
                .map(row_to_build)
                .collect()
        })
        .await
    }

    async fn find_tasks(&self, build: &BuildId) -> BuildRepositoryResult<Vec<Task>> {
        let build_key = build.as_str().to_owned();
        self.run_blocking(move |connection| {
            build_tasks::table
                .filter(build_tasks::build_id.eq(build_key))
                .order(build_tasks::position.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?
                .into_iter()
                .map(row_to_task)
                .collect()
        })
        .await
    }

    async fn mark_activated(
        &self,
        id: &BuildId,
        activated_at: DateTime<Utc>,
    ) -> BuildRepositoryResult<()> {
        let build_id = id.clone();
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let updated = diesel::update(builds::table.filter(builds::id.eq(build_id.as_str())))
                    .set((
                        builds::activated.eq(true),
                        builds::activated_at.eq(Some(activated_at)),
                    ))
                    .execute(tx)?;
                if updated == 0 {
                    return Err(BuildRepositoryError::NotFound(build_id.clone()));
                }
                diesel::update(
                    build_tasks::table.filter(build_tasks::build_id.eq(build_id.as_str())),
                )
                .set(build_tasks::activated.eq(true))
                .execute(tx)?;
                Ok(())
            })
        })
        .await
    }
}

fn to_order_column(order_number: OrderNumber) -> BuildRepositoryResult<i64> {
    i64::try_from(order_number.value()).map_err(BuildRepositoryError::persistence)
}

fn to_build_row(build: &Build) -> BuildRepositoryResult<BuildRow> {
    Ok(BuildRow {
        id: build.id.as_str().to_owned(),
        version_id: build.version_id.as_str().to_owned(),
        project_id: build.project_id.as_str().to_owned(),
        build_variant: build.build_variant.clone(),
        display_name: build.display_name.clone(),
        revision: build.revision.as_str().to_owned(),
        order_number: to_order_column(build.order_number)?,
        task_ids: serde_json::to_value(&build.task_ids).map_err(BuildRepositoryError::persistence)?,
        activated: build.activated,
        activate_at: build.activate_at,
        activated_at: None,
        created_at: build.created_at,
    })
}

fn to_task_row(task: &Task, position: usize) -> BuildRepositoryResult<TaskRow> {
    Ok(TaskRow {
        id: task.id.as_str().to_owned(),
        build_id: task.build_id.as_str().to_owned(),
        version_id: task.version_id.as_str().to_owned(),
        project_id: task.project_id.as_str().to_owned(),
        build_variant: task.build_variant.clone(),
        display_name: task.display_name.clone(),
        revision: task.revision.as_str().to_owned(),
        depends_on: serde_json::to_value(&task.depends_on)
            .map_err(BuildRepositoryError::persistence)?,
        activated: task.activated,
        position: i32::try_from(position).map_err(BuildRepositoryError::persistence)?,
        created_at: task.created_at,
    })
}

fn row_to_build(row: BuildRow) -> BuildRepositoryResult<Build> {
    let persisted_order =
        u64::try_from(row.order_number).map_err(BuildRepositoryError::persistence)?;
    Ok(Build {
        id: BuildId::from_persisted(row.id),
        version_id: VersionId::from_persisted(row.version_id),
        project_id: ProjectId::new(row.project_id).map_err(BuildRepositoryError::persistence)?,
        build_variant: row.build_variant,
        display_name: row.display_name,
        revision: RevisionId::new(row.revision).map_err(BuildRepositoryError::persistence)?,
        order_number: OrderNumber::new(persisted_order)
            .map_err(BuildRepositoryError::persistence)?,
        task_ids: serde_json::from_value::<Vec<TaskId>>(row.task_ids)
            .map_err(BuildRepositoryError::persistence)?,
        activated: row.activated,
        activate_at: row.activate_at,
        created_at: row.created_at,
    })
}

fn row_to_task(row: TaskRow) -> BuildRepositoryResult<Task> {
    Ok(Task {
        id: TaskId::from_persisted(row.id),
        build_id: BuildId::from_persisted(row.build_id),
        version_id: VersionId::from_persisted(row.version_id),
        project_id: ProjectId::new(row.project_id).map_err(BuildRepositoryError::persistence)?,
        build_variant: row.build_variant,
        display_name: row.display_name,
        revision: RevisionId::new(row.revision).map_err(BuildRepositoryError::persistence)?,
        depends_on: serde_json::from_value::<Vec<TaskId>>(row.depends_on)
            .map_err(BuildRepositoryError::persistence)?,
        activated: row.activated,
        created_at: row.created_at,
    })
}
