//! Last successfully ingested revision per project.

use crate::project::domain::ProjectId;
use crate::version::domain::RevisionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tracking cursor for one project.
///
/// Only advanced after a batch has been stored, so every revision newer than
/// `last_revision` is retried on the next run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryWatermark {
    /// Project identifier.
    pub project_id: ProjectId,
    /// Newest revision fully processed.
    pub last_revision: RevisionId,
    /// When the watermark last moved.
    pub updated_at: DateTime<Utc>,
}

impl RepositoryWatermark {
    /// Creates a watermark.
    #[must_use]
    pub const fn new(
        project_id: ProjectId,
        last_revision: RevisionId,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id,
            last_revision,
            updated_at,
        }
    }
}
