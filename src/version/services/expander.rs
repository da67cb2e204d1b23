//! Expansion of a validated version into builds and tasks.

use crate::project::domain::{BuildVariant, ProjectConfig, ProjectRef};
use crate::version::{
    domain::{
        Build, BuildId, BuildStatus, OrderConsistencyError, Task, TaskIdTable, Version,
    },
    ports::{BuildRepository, BuildRepositoryError, VersionRepository, VersionRepositoryError},
};
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for build expansion.
#[derive(Debug, Error)]
pub enum BuildExpansionError {
    /// Version persistence failed.
    #[error(transparent)]
    Versions(#[from] VersionRepositoryError),
    /// Build persistence failed.
    #[error(transparent)]
    Builds(#[from] BuildRepositoryError),
    /// The store rejected the version's order number.
    #[error(transparent)]
    Consistency(#[from] OrderConsistencyError),
}

/// Result of a successful expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionOutcome {
    /// The version and its builds were stored by this call.
    Created(Version),
    /// Another writer stored the revision first; its version is returned and
    /// the builds created by this call were removed.
    AlreadyStored(Version),
    /// Another writer holds the revision's builds but has not stored its
    /// version yet. Nothing was stored by this call; the unsaved candidate is
    /// returned.
    Contended(Version),
}

impl ExpansionOutcome {
    /// Returns the stored version.
    #[must_use]
    pub fn into_version(self) -> Version {
        match self {
            Self::Created(version) | Self::AlreadyStored(version) | Self::Contended(version) => {
                version
            }
        }
    }
}

/// Creates builds and tasks for every enabled variant, then persists the
/// version, deleting the builds again if the version cannot be stored.
#[derive(Clone)]
pub struct BuildExpander<V, B, C>
where
    V: VersionRepository,
    B: BuildRepository,
    C: Clock + Send + Sync,
{
    versions: Arc<V>,
    builds: Arc<B>,
    clock: Arc<C>,
}

impl<V, B, C> BuildExpander<V, B, C>
where
    V: VersionRepository,
    B: BuildRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new expander.
    #[must_use]
    pub const fn new(versions: Arc<V>, builds: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            versions,
            builds,
            clock,
        }
    }

    /// Expands `version` according to `config` and stores the result.
    ///
    /// Task identifiers for every enabled variant are computed before any
    /// build is created so that cross-variant dependencies resolve. Disabled
    /// variants produce nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BuildExpansionError`] when a build or the version cannot be
    /// stored. Builds created by this call are deleted before the error is
    /// returned.
    pub async fn expand(
        &self,
        mut version: Version,
        project: &ProjectRef,
        config: &ProjectConfig,
    ) -> Result<ExpansionOutcome, BuildExpansionError> {
        let now = self.clock.utc();
        let table = TaskIdTable::new(
            config,
            &project.identifier,
            version.revision(),
            version.created_at(),
        );

        let mut created = Vec::new();
        for variant in config.enabled_variants() {
            let status = match self
                .create_build(&version, project, config, variant, &table, now)
                .await
            {
                Ok(status) => status,
                Err(err) => {
                    self.roll_back(&created).await;
                    if !is_build_conflict(&err) {
                        return Err(err);
                    }
                    if let Some(existing) = self
                        .versions
                        .find_by_project_and_revision(&project.identifier, version.revision())
                        .await?
                    {
                        tracing::info!(
                            project = %project.identifier,
                            version_id = %existing.id(),
                            "builds already stored by a concurrent run"
                        );
                        return Ok(ExpansionOutcome::AlreadyStored(existing));
                    }
                    tracing::warn!(
                        project = %project.identifier,
                        version_id = %version.id(),
                        error = %err,
                        "builds held by another run before its version was stored"
                    );
                    return Ok(ExpansionOutcome::Contended(version));
                }
            };
            created.push(status.build_id.clone());
            version.record_build(status);
        }

        match self.versions.insert(&version).await {
            Ok(()) => {
                tracing::info!(
                    project = %project.identifier,
                    version_id = %version.id(),
                    builds = created.len(),
                    "version expanded"
                );
                Ok(ExpansionOutcome::Created(version))
            }
            Err(err) if err.is_duplicate_revision() => {
                self.roll_back(&created).await;
                tracing::info!(
                    project = %project.identifier,
                    version_id = %version.id(),
                    "version already stored by a concurrent run"
                );
                let existing = self
                    .versions
                    .find_by_project_and_revision(&project.identifier, version.revision())
                    .await?;
                Ok(ExpansionOutcome::AlreadyStored(existing.unwrap_or(version)))
            }
            Err(VersionRepositoryError::DuplicateOrderNumber {
                project: taken_in,
                order_number,
            }) => {
                self.roll_back(&created).await;
                Err(OrderConsistencyError::OrderNumberTaken {
                    project: taken_in,
                    order_number,
                }
                .into())
            }
            Err(err) => {
                self.roll_back(&created).await;
                Err(err.into())
            }
        }
    }

    async fn create_build(
        &self,
        version: &Version,
        project: &ProjectRef,
        config: &ProjectConfig,
        variant: &BuildVariant,
        table: &TaskIdTable,
        now: DateTime<Utc>,
    ) -> Result<BuildStatus, BuildExpansionError> {
        let build_id = BuildId::generate(
            &project.identifier,
            &variant.name,
            version.revision(),
            version.created_at(),
        );
        let tasks: Vec<Task> = variant
            .tasks
            .iter()
            .filter_map(|variant_task| {
                let id = table.get(&variant.name, &variant_task.name)?.clone();
                let depends_on = config
                    .task(&variant_task.name)
                    .map(|spec| {
                        spec.depends_on
                            .iter()
                            .filter_map(|dependency| table.resolve(&variant.name, dependency))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                Some(Task {
                    id,
                    build_id: build_id.clone(),
                    version_id: version.id().clone(),
                    project_id: project.identifier.clone(),
                    build_variant: variant.name.clone(),
                    display_name: variant_task.name.clone(),
                    revision: version.revision().clone(),
                    depends_on,
                    activated: false,
                    created_at: now,
                })
            })
            .collect();

        let activate_at = self.activation_time(project, variant, now).await?;
        let build = Build {
            id: build_id,
            version_id: version.id().clone(),
            project_id: project.identifier.clone(),
            build_variant: variant.name.clone(),
            display_name: variant.display_name().to_owned(),
            revision: version.revision().clone(),
            order_number: version.order_number(),
            task_ids: tasks.iter().map(|task| task.id.clone()).collect(),
            activated: false,
            activate_at,
            created_at: now,
        };
        self.builds.insert(&build, &tasks).await?;
        tracing::debug!(
            project = %project.identifier,
            build_id = %build.id,
            tasks = tasks.len(),
            %activate_at,
            "build created"
        );
        Ok(BuildStatus::pending(variant.name.clone(), build.id, activate_at))
    }

    /// Staggers activation behind the variant's last recorded activation.
    async fn activation_time(
        &self,
        project: &ProjectRef,
        variant: &BuildVariant,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, BuildExpansionError> {
        let last = self
            .versions
            .find_last_variant_activation(&project.identifier, &variant.name)
            .await?;
        Ok(last
            .as_ref()
            .and_then(|version| version.build_status(&variant.name))
            .map_or(now, |status| {
                offset_by_minutes(status.activate_at, project.batch_time_for(variant))
            }))
    }

    async fn roll_back(&self, created: &[BuildId]) {
        for build_id in created {
            if let Err(err) = self.builds.delete(build_id).await {
                tracing::error!(build_id = %build_id, error = %err, "failed to delete orphaned build");
            }
        }
    }
}

const fn is_build_conflict(err: &BuildExpansionError) -> bool {
    matches!(
        err,
        BuildExpansionError::Builds(
            BuildRepositoryError::DuplicateBuild(_) | BuildRepositoryError::DuplicateTask(_)
        )
    )
}

fn offset_by_minutes(base: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    TimeDelta::try_minutes(i64::from(minutes))
        .and_then(|delta| base.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
