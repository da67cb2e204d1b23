//! Version aggregate root and per-variant build status.

use super::{BuildId, OrderNumber, Revision, RevisionId, VersionDomainError, VersionId};
use crate::project::domain::{ProjectId, ProjectRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version lifecycle state within ingestion.
///
/// Activation and execution states belong to the execution subsystem; a
/// version leaves ingestion in `Created` whether it is a stub or expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Version has been created by ingestion.
    Created,
}

impl VersionStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
        }
    }
}

impl TryFrom<&str> for VersionStatus {
    type Error = VersionDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            _ => Err(VersionDomainError::UnknownStatus(value.to_owned())),
        }
    }
}

/// Activation bookkeeping for one build variant of a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    /// Build variant name.
    pub build_variant: String,
    /// Build created for the variant.
    pub build_id: BuildId,
    /// Whether the build has been activated.
    pub activated: bool,
    /// Earliest time the build becomes eligible for activation.
    pub activate_at: DateTime<Utc>,
    /// Time the build was actually activated.
    #[serde(default)]
    pub activated_at: Option<DateTime<Utc>>,
}

impl BuildStatus {
    /// Creates a pending (not yet activated) status.
    #[must_use]
    pub fn pending(
        build_variant: impl Into<String>,
        build_id: BuildId,
        activate_at: DateTime<Utc>,
    ) -> Self {
        Self {
            build_variant: build_variant.into(),
            build_id,
            activated: false,
            activate_at,
            activated_at: None,
        }
    }

    /// Returns `true` when the status is pending and eligible at `now`.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.activated && self.activate_at <= now
    }
}

/// Version aggregate root: one project revision's evaluated state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    id: VersionId,
    project_id: ProjectId,
    revision: RevisionId,
    order_number: OrderNumber,
    author: String,
    author_email: String,
    author_external_id: Option<String>,
    message: String,
    branch: String,
    created_at: DateTime<Utc>,
    status: VersionStatus,
    config: Option<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    ignored: bool,
    build_ids: Vec<BuildId>,
    build_statuses: Vec<BuildStatus>,
}

/// Parameter object for reconstructing a persisted version aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedVersionData {
    /// Persisted version identifier.
    pub id: VersionId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Source revision.
    pub revision: RevisionId,
    /// Per-project order number.
    pub order_number: OrderNumber,
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
    pub status: VersionStatus,
    /// Serialized project configuration.
    pub config: Option<String>,
    /// Warning-level messages.
    pub warnings: Vec<String>,
    /// Error-level messages.
    pub errors: Vec<String>,
    /// Whether every changed file matched an ignore rule.
    pub ignored: bool,
    /// Builds created for the version.
    pub build_ids: Vec<BuildId>,
    /// Activation state per build variant.
    pub build_statuses: Vec<BuildStatus>,
}

impl Version {
    /// Creates a version shell from revision metadata.
    ///
    /// The shell carries no configuration, diagnostics or builds.
    #[must_use]
    pub fn from_revision(
        project: &ProjectRef,
        revision: &Revision,
        order_number: OrderNumber,
    ) -> Self {
        Self {
            id: VersionId::for_revision(&project.identifier, revision.id()),
            project_id: project.identifier.clone(),
            revision: revision.id().clone(),
            order_number,
            author: revision.author().to_owned(),
            author_email: revision.author_email().to_owned(),
            author_external_id: revision.author_external_id().map(str::to_owned),
            message: revision.message().to_owned(),
            branch: project.branch.clone(),
            created_at: revision.created_at(),
            status: VersionStatus::Created,
            config: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            ignored: false,
            build_ids: Vec::new(),
            build_statuses: Vec::new(),
        }
    }

    /// Reconstructs a version from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedVersionData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            revision: data.revision,
            order_number: data.order_number,
            author: data.author,
            author_email: data.author_email,
            author_external_id: data.author_external_id,
            message: data.message,
            branch: data.branch,
            created_at: data.created_at,
            status: data.status,
            config: data.config,
            warnings: data.warnings,
            errors: data.errors,
            ignored: data.ignored,
            build_ids: data.build_ids,
            build_statuses: data.build_statuses,
        }
    }

    /// Returns the version identifier.
    #[must_use]
    pub const fn id(&self) -> &VersionId {
        &self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the source revision.
    #[must_use]
    pub const fn revision(&self) -> &RevisionId {
        &self.revision
    }

    /// Returns the per-project order number.
    #[must_use]
    pub const fn order_number(&self) -> OrderNumber {
        self.order_number
    }

    /// Returns the revision author name.
    #[must_use]
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns the revision author email.
    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    /// Returns the author's hosting-service identifier, if known.
    #[must_use]
    pub fn author_external_id(&self) -> Option<&str> {
        self.author_external_id.as_deref()
    }

    /// Returns the commit message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the tracked branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the revision timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> VersionStatus {
        self.status
    }

    /// Returns the serialized project configuration, if resolved.
    #[must_use]
    pub fn config(&self) -> Option<&str> {
        self.config.as_deref()
    }

    /// Returns warning-level messages.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns error-level messages.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns `true` when every changed file matched an ignore rule.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// Returns the builds created for this version.
    #[must_use]
    pub fn build_ids(&self) -> &[BuildId] {
        &self.build_ids
    }

    /// Returns activation state per build variant.
    #[must_use]
    pub fn build_statuses(&self) -> &[BuildStatus] {
        &self.build_statuses
    }

    /// Returns the status recorded for a build variant.
    #[must_use]
    pub fn build_status(&self, build_variant: &str) -> Option<&BuildStatus> {
        self.build_statuses
            .iter()
            .find(|status| status.build_variant == build_variant)
    }

    /// Returns `true` for a terminal stub: errors recorded, no builds.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Stores the serialized project configuration.
    pub fn set_config(&mut self, config: String) {
        self.config = Some(config);
    }

    /// Marks whether the version is excluded from default scheduling.
    pub const fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Appends warning- and error-level messages.
    pub fn record_diagnostics(
        &mut self,
        warnings: impl IntoIterator<Item = String>,
        errors: impl IntoIterator<Item = String>,
    ) {
        self.warnings.extend(warnings);
        self.errors.extend(errors);
    }

    /// Records a build created during expansion.
    pub fn record_build(&mut self, status: BuildStatus) {
        self.build_ids.push(status.build_id.clone());
        self.build_statuses.push(status);
    }

    /// Marks a variant's build as activated.
    ///
    /// Returns `false` when the version has no status for the variant.
    pub fn mark_variant_activated(
        &mut self,
        build_variant: &str,
        activated_at: DateTime<Utc>,
    ) -> bool {
        let Some(status) = self
            .build_statuses
            .iter_mut()
            .find(|status| status.build_variant == build_variant)
        else {
            return false;
        };
        status.activated = true;
        status.activated_at = Some(activated_at);
        true
    }
}
