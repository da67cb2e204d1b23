//! Diesel row models for repository watermarks.

use super::schema::repository_watermarks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Row for watermark records, used for both reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = repository_watermarks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WatermarkRow {
    /// Project identifier.
    pub project_id: String,
    /// Newest fully processed revision.
    pub last_revision: String,
    /// Time of the last advance.
    pub updated_at: DateTime<Utc>,
}
