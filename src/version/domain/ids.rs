//! Identifier and validated scalar types for the version domain.

use super::VersionDomainError;
use crate::project::domain::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp layout embedded in build and task identifiers.
const ID_TIMESTAMP_FORMAT: &str = "%y_%m_%d_%H_%M_%S";

/// Replaces every character that is not ASCII alphanumeric or `_` with `_`.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    raw.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Content hash identifying one source-control revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    /// Creates a validated revision identifier.
    ///
    /// # Errors
    ///
    /// Returns [`VersionDomainError::InvalidRevisionId`] when the value is
    /// empty or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, VersionDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(VersionDomainError::InvalidRevisionId(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the revision identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RevisionId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a version, unique per (project, revision).
///
/// The identifier is derived from the project and revision so that
/// concurrent runs ingesting the same revision collide on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Derives the version identifier for a project revision.
    #[must_use]
    pub fn for_revision(project: &ProjectId, revision: &RevisionId) -> Self {
        Self(clean_name(&format!("{project}_{revision}")))
    }

    /// Wraps a persisted identifier without re-deriving it.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a build (one build variant of a version).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(String);

impl BuildId {
    /// Derives the build identifier for a variant of a project revision.
    #[must_use]
    pub fn generate(
        project: &ProjectId,
        variant: &str,
        revision: &RevisionId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let stamp = created_at.format(ID_TIMESTAMP_FORMAT);
        Self(clean_name(&format!("{project}_{variant}_{revision}_{stamp}")))
    }

    /// Wraps a persisted identifier without re-deriving it.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a task within a build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Derives the task identifier for a task of a variant at a revision.
    #[must_use]
    pub fn generate(
        project: &ProjectId,
        variant: &str,
        task: &str,
        revision: &RevisionId,
        created_at: DateTime<Utc>,
    ) -> Self {
        let stamp = created_at.format(ID_TIMESTAMP_FORMAT);
        Self(clean_name(&format!(
            "{project}_{variant}_{task}_{revision}_{stamp}"
        )))
    }

    /// Wraps a persisted identifier without re-deriving it.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly increasing per-project sequence number of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(u64);

impl OrderNumber {
    /// Largest order number representable in the `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// The first order number assigned in a project.
    pub const FIRST: Self = Self(1);

    /// Creates a validated order number.
    ///
    /// # Errors
    ///
    /// Returns [`VersionDomainError::InvalidOrderNumber`] when the value is
    /// zero or exceeds the schema-backed maximum (`i64::MAX`).
    pub const fn new(value: u64) -> Result<Self, VersionDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(VersionDomainError::InvalidOrderNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the following order number, if representable.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) if next <= Self::MAX_PERSISTED_VALUE => Some(Self(next)),
            _ => None,
        }
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
