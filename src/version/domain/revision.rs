//! Source-control revision records consumed by ingestion.

use super::RevisionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable source-control change as reported by a revision source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    id: RevisionId,
    author: String,
    author_email: String,
    author_external_id: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

impl Revision {
    /// Creates a revision record.
    #[must_use]
    pub fn new(
        id: RevisionId,
        author: impl Into<String>,
        author_email: impl Into<String>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author: author.into(),
            author_email: author_email.into(),
            author_external_id: None,
            message: message.into(),
            created_at,
        }
    }

    /// Sets the author's identifier on the hosting service.
    #[must_use]
    pub fn with_author_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.author_external_id = Some(external_id.into());
        self
    }

    /// Returns the revision identifier.
    #[must_use]
    pub const fn id(&self) -> &RevisionId {
        &self.id
    }

    /// Returns the author name.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the author email address.
    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    /// Returns the author's identifier on the hosting service, if known.
    #[must_use]
    pub fn author_external_id(&self) -> Option<&str> {
        self.author_external_id.as_deref()
    }

    /// Returns the commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the commit timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
