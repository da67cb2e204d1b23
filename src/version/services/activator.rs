//! Activation of due builds after ingestion.

use crate::project::domain::ProjectRef;
use crate::version::{
    domain::{BuildId, VersionId},
    ports::{BuildRepository, BuildRepositoryError, VersionRepository, VersionRepositoryError},
};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for project activation.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Version persistence failed.
    #[error(transparent)]
    Versions(#[from] VersionRepositoryError),
    /// Build persistence failed.
    #[error(transparent)]
    Builds(#[from] BuildRepositoryError),
}

/// A build activated by [`ProjectActivator::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedBuild {
    /// Version owning the build.
    pub version_id: VersionId,
    /// Build variant name.
    pub build_variant: String,
    /// Activated build.
    pub build_id: BuildId,
}

/// Activates the newest due build of each variant.
///
/// Older due builds of the same variant stay pending, so a burst of commits
/// leads to one activation per variant rather than one per commit. A pending
/// build older than the variant's last activation is never activated.
#[derive(Clone)]
pub struct ProjectActivator<V, B, C>
where
    V: VersionRepository,
    B: BuildRepository,
    C: Clock + Send + Sync,
{
    versions: Arc<V>,
    builds: Arc<B>,
    clock: Arc<C>,
}

impl<V, B, C> ProjectActivator<V, B, C>
where
    V: VersionRepository,
    B: BuildRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new activator.
    #[must_use]
    pub const fn new(versions: Arc<V>, builds: Arc<B>, clock: Arc<C>) -> Self {
        Self {
            versions,
            builds,
            clock,
        }
    }

    /// Activates due builds for `project`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError`] when a repository fails; builds activated
    /// before the failure stay activated.
    pub async fn activate(
        &self,
        project: &ProjectRef,
    ) -> Result<Vec<ActivatedBuild>, ActivationError> {
        let now = self.clock.utc();
        let pending = self
            .versions
            .find_pending_activation(&project.identifier, now)
            .await?;

        let mut handled: HashSet<String> = HashSet::new();
        let mut activated = Vec::new();
        for version in &pending {
            for status in version.build_statuses() {
                if !status.is_due(now) || !handled.insert(status.build_variant.clone()) {
                    continue;
                }
                let last_activated = self
                    .versions
                    .find_last_variant_activation(&project.identifier, &status.build_variant)
                    .await?
                    .map(|last| last.order_number());
                if last_activated.is_some_and(|last| last > version.order_number()) {
                    tracing::debug!(
                        project = %project.identifier,
                        version_id = %version.id(),
                        build_variant = %status.build_variant,
                        "skipping build superseded by a newer activation"
                    );
                    continue;
                }
                self.versions
                    .mark_variant_activated(version.id(), &status.build_variant, now)
                    .await?;
                self.builds.mark_activated(&status.build_id, now).await?;
                tracing::info!(
                    project = %project.identifier,
                    version_id = %version.id(),
                    build_id = %status.build_id,
                    build_variant = %status.build_variant,
                    "build activated"
                );
                activated.push(ActivatedBuild {
                    version_id: version.id().clone(),
                    build_variant: status.build_variant.clone(),
                    build_id: status.build_id.clone(),
                });
            }
        }
        Ok(activated)
    }
}
