//! Builds and tasks expanded from a version's configuration.

use super::{BuildId, OrderNumber, RevisionId, TaskId, VersionId};
use crate::project::domain::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One build variant's expansion of a version.
///
/// A build is owned by exactly one version and is only ever deleted as part
/// of that version's failed persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Build identifier.
    pub id: BuildId,
    /// Owning version.
    pub version_id: VersionId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Build variant name.
    pub build_variant: String,
    /// Human-readable variant name.
    pub display_name: String,
    /// Source revision.
    pub revision: RevisionId,
    /// Order number of the owning version.
    pub order_number: OrderNumber,
    /// Tasks belonging to the build, in configuration order.
    pub task_ids: Vec<TaskId>,
    /// Whether the build has been activated.
    pub activated: bool,
    /// Earliest time the build becomes eligible for activation.
    pub activate_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A schedulable unit of work within a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Owning build.
    pub build_id: BuildId,
    /// Owning version.
    pub version_id: VersionId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Build variant name.
    pub build_variant: String,
    /// Task name from the project configuration.
    pub display_name: String,
    /// Source revision.
    pub revision: RevisionId,
    /// Tasks that must finish before this one.
    pub depends_on: Vec<TaskId>,
    /// Whether the task has been activated.
    pub activated: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
