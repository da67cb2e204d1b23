//! `PostgreSQL` repository implementation for watermarks.

use super::{models::WatermarkRow, schema::repository_watermarks};
use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::RepositoryWatermark,
    ports::{WatermarkRepository, WatermarkRepositoryError, WatermarkRepositoryResult},
};
use crate::version::{adapters::postgres::IngestionPgPool, domain::RevisionId};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// `PostgreSQL`-backed watermark repository.
#[derive(Debug, Clone)]
pub struct PostgresWatermarkRepository {
    pool: IngestionPgPool,
}

impl PostgresWatermarkRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IngestionPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WatermarkRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WatermarkRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WatermarkRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WatermarkRepositoryError::persistence)?
    }
}

#[async_trait]
impl WatermarkRepository for PostgresWatermarkRepository {
    async fn find(
        &self,
        project: &ProjectId,
    ) -> WatermarkRepositoryResult<Option<RepositoryWatermark>> {
        let project_key = project.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = repository_watermarks::table
                .filter(repository_watermarks::project_id.eq(project_key))
                .select(WatermarkRow::as_select())
                .first::<WatermarkRow>(connection)
                .optional()
                .map_err(WatermarkRepositoryError::persistence)?;
            row.map(row_to_watermark).transpose()
        })
        .await
    }

    async fn advance(&self, watermark: &RepositoryWatermark) -> WatermarkRepositoryResult<()> {
        let row = WatermarkRow {
            project_id: watermark.project_id.as_str().to_owned(),
            last_revision: watermark.last_revision.as_str().to_owned(),
            updated_at: watermark.updated_at,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(repository_watermarks::table)
                .values(&row)
                .on_conflict(repository_watermarks::project_id)
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(WatermarkRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn row_to_watermark(row: WatermarkRow) -> WatermarkRepositoryResult<RepositoryWatermark> {
    Ok(RepositoryWatermark::new(
        ProjectId::new(row.project_id).map_err(WatermarkRepositoryError::persistence)?,
        RevisionId::new(row.last_revision).map_err(WatermarkRepositoryError::persistence)?,
        row.updated_at,
    ))
}
