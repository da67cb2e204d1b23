//! `PostgreSQL` repository implementation for version storage.

use super::{
    IngestionPgPool,
    models::{NewVersionRow, VersionRow},
    schema::versions,
};
use crate::project::domain::ProjectId;
use crate::version::{
    domain::{
        OrderNumber, PersistedVersionData, RevisionId, Version, VersionId,
        VersionStatus,
    },
    ports::{VersionRepository, VersionRepositoryError, VersionRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

const VERSION_COLUMNS: &str = concat!(
    "id, project_id, revision, order_number, author, author_email, author_external_id, ",
    "message, branch, created_at, status, config, warnings, errors, ignored, build_ids, ",
    "build_statuses",
);

/// `PostgreSQL`-backed version repository.
#[derive(Debug, Clone)]
pub struct PostgresVersionRepository {
    pool: IngestionPgPool,
}

impl PostgresVersionRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IngestionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> VersionRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> VersionRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(VersionRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(VersionRepositoryError::persistence)?
    }
}

#[async_trait]
impl VersionRepository for PostgresVersionRepository {
    async fn insert(&self, version: &Version) -> VersionRepositoryResult<()> {
        let new_row = to_new_row(version)?;
        let version_id = version.id().clone();
        let project = version.project_id().clone();
        let revision = version.revision().clone();
        let order_number = version.order_number();

        self.run_blocking(move |connection| {
            diesel::insert_into(versions::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
                        match info.constraint_name() {
                            Some(REVISION_CONSTRAINT) => VersionRepositoryError::DuplicateRevision {
                                project,
                                revision,
                            },
                            Some(ORDER_CONSTRAINT) => VersionRepositoryError::DuplicateOrderNumber {
                                project,
                                order_number,
                            },
                            _ => VersionRepositoryError::DuplicateVersion(version_id),
                        }
                    }
                    _ => VersionRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: &VersionId) -> VersionRepositoryResult<Option<Version>> {
        let lookup = id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = versions::table
                .filter(versions::id.eq(lookup))
                .select(VersionRow::as_select())
                .first::<VersionRow>(connection)
                .optional()
                .map_err(VersionRepositoryError::persistence)?;
            row.map(row_to_version).transpose()
        })
        .await
    }

    async fn find_by_project_and_revision(
        &self,
        project: &ProjectId,
        revision: &RevisionId,
    ) -> VersionRepositoryResult<Option<Version>> {
        let project_key = project.as_str().to_owned();
        let revision_key = revision.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = versions::table
                .filter(versions::project_id.eq(project_key))
                .filter(versions::revision.eq(revision_key))
                .select(VersionRow::as_select())
                .first::<VersionRow>(connection)
                .optional()
                .map_err(VersionRepositoryError::persistence)?;
            row.map(row_to_version).transpose()
        })
        .await
    }

    async fn find_latest(&self, project: &ProjectId) -> VersionRepositoryResult<Option<Version>> {
        let project_key = project.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = versions::table
                .filter(versions::project_id.eq(project_key))
                .order(versions::order_number.desc())
                .select(VersionRow::as_select())
                .first::<VersionRow>(connection)
                .optional()
                .map_err(VersionRepositoryError::persistence)?;
            row.map(row_to_version).transpose()
        })
        .await
    }

    async fn find_last_variant_activation(
        &self,
        project: &ProjectId,
        build_variant: &str,
    ) -> VersionRepositoryResult<Option<Version>> {
        let project_key = project.as_str().to_owned();
        let variant = build_variant.to_owned();
        self.run_blocking(move |connection| {
            let query = diesel::sql_query(format!(
                concat!(
                    "SELECT {} FROM versions WHERE project_id = $1 ",
                    "AND build_statuses @> jsonb_build_array(",
                    "jsonb_build_object('build_variant', $2::text, 'activated', true)) ",
                    "ORDER BY order_number DESC LIMIT 1",
                ),
                VERSION_COLUMNS
            ))
            .bind::<diesel::sql_types::Text, _>(project_key.as_str())
            .bind::<diesel::sql_types::Text, _>(variant.as_str());
            let row = query
                .get_result::<VersionRow>(connection)
                .optional()
                .map_err(VersionRepositoryError::persistence)?;
            row.map(row_to_version).transpose()
        })
        .await
    }

    async fn find_pending_activation(
        &self,
        project: &ProjectId,
        due_by: DateTime<Utc>,
    ) -> VersionRepositoryResult<Vec<Version>> {
        let project_key = project.as_str().to_owned();
        self.run_blocking(move |connection| {
            let query = diesel::sql_query(format!(
                concat!(
                    "SELECT {} FROM versions WHERE project_id = $1 AND NOT ignored ",
                    "AND build_statuses @> '[{{\"activated\": false}}]'::jsonb ",
                    "ORDER BY order_number DESC",
                ),
                VERSION_COLUMNS
            ))
            .bind::<diesel::sql_types::Text, _>(project_key.as_str());
            let rows = query
                .load::<VersionRow>(connection)
                .map_err(VersionRepositoryError::persistence)?;
            let mut pending = Vec::with_capacity(rows.len());
            for row in rows {
                let version = row_to_version(row)?;
                if version
                    .build_statuses()
                    .iter()
                    .any(|status| status.is_due(due_by))
                {
                    pending.push(version);
                }
            }
            Ok(pending)
        })
        .await
    }

    async fn mark_variant_activated(
        &self,
        id: &VersionId,
        build_variant: &str,
        activated_at: DateTime<Utc>,
    ) -> VersionRepositoryResult<()> {
        let version_id = id.clone();
        let variant = build_variant.to_owned();
        self.run_blocking(move |connection| {
            connection.transaction(|tx| {
                let row = versions::table
                    .filter(versions::id.eq(version_id.as_str()))
                    .select(VersionRow::as_select())
                    .for_update()
                    .first::<VersionRow>(tx)
                    .optional()
                    .map_err(VersionRepositoryError::persistence)?
                    .ok_or_else(|| VersionRepositoryError::NotFound(version_id.clone()))?;
                let mut version = row_to_version(row)?;
                if !version.mark_variant_activated(&variant, activated_at) {
                    return Err(VersionRepositoryError::NotFound(version_id.clone()));
                }
                let statuses = serde_json::to_value(version.build_statuses())
                    .map_err(VersionRepositoryError::persistence)?;
                diesel::update(versions::table.filter(versions::id.eq(version_id.as_str())))
                    .set(versions::build_statuses.eq(statuses))
                    .execute(tx)
                    .map_err(VersionRepositoryError::persistence)?;
                Ok(())
            })
        })
        .await
    }
}

const REVISION_CONSTRAINT: &str = "idx_versions_project_revision_unique";
const ORDER_CONSTRAINT: &str = "idx_versions_project_order_unique";

impl From<DieselError> for VersionRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

fn to_new_row(version: &Version) -> VersionRepositoryResult<NewVersionRow> {
    let order_number = i64::try_from(version.order_number().value())
        .map_err(VersionRepositoryError::persistence)?;
    Ok(NewVersionRow {
        id: version.id().as_str().to_owned(),
        project_id: version.project_id().as_str().to_owned(),
        revision: version.revision().as_str().to_owned(),
        order_number,
        author: version.author().to_owned(),
        author_email: version.author_email().to_owned(),
        author_external_id: version.author_external_id().map(str::to_owned),
        message: version.message().to_owned(),
        branch: version.branch().to_owned(),
        created_at: version.created_at(),
        status: version.status().as_str().to_owned(),
        config: version.config().map(str::to_owned),
        warnings: to_json(version.warnings())?,
        errors: to_json(version.errors())?,
        ignored: version.is_ignored(),
        build_ids: to_json(version.build_ids())?,
        build_statuses: to_json(version.build_statuses())?,
    })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> VersionRepositoryResult<serde_json::Value> {
    serde_json::to_value(value).map_err(VersionRepositoryError::persistence)
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> VersionRepositoryResult<T> {
    serde_json::from_value(value).map_err(VersionRepositoryError::persistence)
}

fn row_to_version(row: VersionRow) -> VersionRepositoryResult<Version> {
    let persisted_order =
        u64::try_from(row.order_number).map_err(VersionRepositoryError::persistence)?;
    let data = PersistedVersionData {
        id: VersionId::from_persisted(row.id),
        project_id: ProjectId::new(row.project_id).map_err(VersionRepositoryError::persistence)?,
        revision: RevisionId::new(row.revision).map_err(VersionRepositoryError::persistence)?,
        order_number: OrderNumber::new(persisted_order)
            .map_err(VersionRepositoryError::persistence)?,
        author: row.author,
        author_email: row.author_email,
        author_external_id: row.author_external_id,
        message: row.message,
        branch: row.branch,
        created_at: row.created_at,
        status: VersionStatus::try_from(row.status.as_str())
            .map_err(VersionRepositoryError::persistence)?,
        config: row.config,
        warnings: from_json(row.warnings)?,
        errors: from_json(row.errors)?,
        ignored: row.ignored,
        build_ids: from_json(row.build_ids)?,
        build_statuses: from_json(row.build_statuses)?,
    };
    Ok(Version::from_persisted(data))
}
