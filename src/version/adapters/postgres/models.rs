//! Diesel row models for version ingestion persistence.

use super::schema::{build_tasks, builds, versions};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for version records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = versions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VersionRow {
    /// Version identifier.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub id: String,
    /// Owning project.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub project_id: String,
    /// Source revision.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub revision: String,
    /// Per-project order number.
    #[diesel(sql_type = diesel::sql_types::Int8)]
    pub order_number: i64,
    /// Revision author name.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub author: String,
    /// Revision author email.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub author_email: String,
    /// Revision author's hosting-service identifier.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub author_external_id: Option<String>,
    /// Commit message.
    #[diesel(sql_type = diesel::sql_types::Text)]
    pub message: String,
    /// Tracked branch.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub branch: String,
    /// Revision timestamp.
    #[diesel(sql_type = diesel::sql_types::Timestamptz)]
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    #[diesel(sql_type = diesel::sql_types::Varchar)]
    pub status: String,
    /// Serialized project configuration.
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    pub config: Option<String>,
    /// Warning messages.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub warnings: Value,
    /// Error messages.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub errors: Value,
    /// Ignore flag.
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub ignored: bool,
    /// Build identifiers.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub build_ids: Value,
    /// Activation state per build variant.
    #[diesel(sql_type = diesel::sql_types::Jsonb)]
    pub build_statuses: Value,
}

/// Insert model for version records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = versions)]
pub struct NewVersionRow {
    /// Version identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Source revision.
    pub revision: String,
    /// Per-project order number.
    pub order_number: i64,
    /// Revision author name.
    pub author: String,
    /// Revision author email.
    pub author_email: String,
    /// Revision author's hosting-service identifier.
    pub author_external_id: Option<String>,
    /// Commit message.
    pub message: String,
    /// Tracked branch.
    pub branch: String,
    /// Revision timestamp.
    pub created_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Serialized project configuration.
    pub config: Option<String>,
    /// Warning messages.
    pub warnings: Value,
    /// Error messages.
    pub errors: Value,
    /// Ignore flag.
    pub ignored: bool,
    /// Build identifiers.
    pub build_ids: Value,
    /// Activation state per build variant.
    pub build_statuses: Value,
}

/// Query result row for build records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = builds)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BuildRow {
    /// Build identifier.
    pub id: String,
    /// Owning version.
    pub version_id: String,
    /// Owning project.
    pub project_id: String,
    /// Build variant name.
    pub build_variant: String,
    /// Human-readable variant name.
    pub display_name: String,
    /// Source revision.
    pub revision: String,
    /// Order number of the owning version.
    pub order_number: i64,
    /// Task identifiers.
    pub task_ids: Value,
    /// Activation flag.
    pub activated: bool,
    /// Earliest activation time.
    pub activate_at: DateTime<Utc>,
    /// Actual activation time.
    pub activated_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = build_tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: String,
    /// Owning build.
    pub build_id: String,
    /// Owning version.
    pub version_id: String,
    /// Owning project.
    pub project_id: String,
    /// Build variant name.
    pub build_variant: String,
    /// Task name.
    pub display_name: String,
    /// Source revision.
    pub revision: String,
    /// Prerequisite task identifiers.
    pub depends_on: Value,
    /// Activation flag.
    pub activated: bool,
    /// Position within the owning build.
    pub position: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
