//! Service turning revisions into stored versions.

use super::expander::{BuildExpander, BuildExpansionError, ExpansionOutcome};
use crate::interrupt::{Interrupted, interruptible};
use crate::project::{
    domain::{ConfigDiagnostics, ConfigParseError, IgnoreRules, ProjectConfig, ProjectRef},
    ports::ProjectValidator,
    services::{ConfigResolutionError, ConfigResolver, SyntaxValidator},
};
use crate::tracker::{
    domain::DEFAULT_FETCH_TIMEOUT_SECS,
    ports::RevisionSource,
};
use crate::version::{
    domain::{OrderConsistencyError, OrderNumber, Revision, RevisionId, Version},
    ports::{
        BuildRepository, OrderNumberCounter, OrderNumberError, VersionCreatedHook,
        VersionRepository, VersionRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Service-level errors for version building. Every variant aborts the
/// remainder of the batch.
#[derive(Debug, Error)]
pub enum VersionBuilderError {
    /// Configuration could not be resolved for infrastructural reasons.
    #[error(transparent)]
    Config(#[from] ConfigResolutionError),
    /// The per-project ordering invariants would be violated.
    #[error(transparent)]
    Consistency(#[from] OrderConsistencyError),
    /// Version persistence failed.
    #[error(transparent)]
    Versions(#[from] VersionRepositoryError),
    /// Build expansion failed.
    #[error(transparent)]
    Expansion(#[from] BuildExpansionError),
    /// The order-number counter failed.
    #[error(transparent)]
    OrderNumber(#[from] OrderNumberError),
    /// The resolved configuration could not be serialized onto the version.
    #[error("failed to serialize resolved configuration: {0}")]
    ConfigSerialization(#[source] ConfigParseError),
    /// The run was cancelled or an external fetch timed out.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Result type for version builder operations.
pub type VersionBuilderResult<T> = Result<T, VersionBuilderError>;

/// What [`VersionBuilder::build`] did with a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// A version for the revision was already stored.
    Existing(Version),
    /// A stub version carrying configuration errors was stored.
    Stub(Version),
    /// A fully expanded version was stored.
    Expanded(Version),
    /// A concurrent run is storing the revision; nothing was stored here.
    Contended(Version),
}

impl BuildOutcome {
    /// Returns the version regardless of outcome.
    #[must_use]
    pub const fn version(&self) -> &Version {
        match self {
            Self::Existing(version)
            | Self::Stub(version)
            | Self::Expanded(version)
            | Self::Contended(version) => version,
        }
    }

    /// Consumes the outcome, returning the version.
    #[must_use]
    pub fn into_version(self) -> Version {
        match self {
            Self::Existing(version)
            | Self::Stub(version)
            | Self::Expanded(version)
            | Self::Contended(version) => version,
        }
    }
}

/// Repositories used to store versions, builds and order numbers.
#[derive(Clone)]
pub struct IngestionStore<V, B, O>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
{
    /// Version repository.
    pub versions: Arc<V>,
    /// Build and task repository.
    pub builds: Arc<B>,
    /// Per-project order-number counter.
    pub counter: Arc<O>,
}

impl<V, B, O> IngestionStore<V, B, O>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
{
    /// Groups the ingestion repositories.
    #[must_use]
    pub const fn new(versions: Arc<V>, builds: Arc<B>, counter: Arc<O>) -> Self {
        Self {
            versions,
            builds,
            counter,
        }
    }
}

/// Version builder orchestration service.
#[derive(Clone)]
pub struct VersionBuilder<V, B, O, C>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
    C: Clock + Send + Sync,
{
    store: IngestionStore<V, B, O>,
    expander: BuildExpander<V, B, C>,
    resolver: ConfigResolver,
    revisions: Arc<dyn RevisionSource>,
    validator: Arc<dyn ProjectValidator>,
    hook: Option<Arc<dyn VersionCreatedHook>>,
    fetch_timeout: Duration,
}

impl<V, B, O, C> VersionBuilder<V, B, O, C>
where
    V: VersionRepository,
    B: BuildRepository,
    O: OrderNumberCounter,
    C: Clock + Send + Sync,
{
    /// Creates a builder validating with [`SyntaxValidator`] and no hook.
    #[must_use]
    pub fn new(
        store: IngestionStore<V, B, O>,
        resolver: ConfigResolver,
        revisions: Arc<dyn RevisionSource>,
        clock: Arc<C>,
    ) -> Self {
        let expander = BuildExpander::new(
            Arc::clone(&store.versions),
            Arc::clone(&store.builds),
            clock,
        );
        Self {
            store,
            expander,
            resolver,
            revisions,
            validator: Arc::new(SyntaxValidator::new()),
            hook: None,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// Replaces the configuration validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ProjectValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Notifies `hook` after each full expansion.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn VersionCreatedHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Bounds each external fetch by `timeout`.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Stores a batch of revisions, oldest first.
    ///
    /// `revisions` is ordered newest first, as returned by the revision
    /// source. Returns the version of the newest revision.
    ///
    /// # Errors
    ///
    /// Returns the first [`VersionBuilderError`]; later revisions of the
    /// batch are not processed.
    pub async fn store_revisions(
        &self,
        project: &ProjectRef,
        revisions: &[Revision],
        cancel: &CancellationToken,
    ) -> VersionBuilderResult<Option<Version>> {
        let mut newest = None;
        for revision in revisions.iter().rev() {
            if cancel.is_cancelled() {
                return Err(Interrupted::Cancelled.into());
            }
            let outcome = self.build(project, revision, cancel).await?;
            newest = Some(outcome.into_version());
        }
        Ok(newest)
    }

    /// Stores the version for one revision.
    ///
    /// A revision that already has a version is returned unchanged. A
    /// missing or malformed configuration, or blocking validation errors,
    /// produce a stub version without builds.
    ///
    /// # Errors
    ///
    /// Returns [`VersionBuilderError`] for fatal configuration failures,
    /// ordering violations, persistence failures and interruption.
    pub async fn build(
        &self,
        project: &ProjectRef,
        revision: &Revision,
        cancel: &CancellationToken,
    ) -> VersionBuilderResult<BuildOutcome> {
        if let Some(existing) = self
            .store
            .versions
            .find_by_project_and_revision(&project.identifier, revision.id())
            .await?
        {
            tracing::debug!(
                project = %project.identifier,
                revision = %revision.id(),
                "version already exists"
            );
            return Ok(BuildOutcome::Existing(existing));
        }

        let resolution = interruptible(
            cancel,
            self.fetch_timeout,
            self.resolver.resolve(project, revision.id()),
        )
        .await?;
        let resolved = match resolution {
            Ok(resolved) => resolved,
            Err(ConfigResolutionError::Recoverable(diagnostics)) => {
                return self.store_stub(project, revision, diagnostics).await;
            }
            Err(fatal) => return Err(fatal.into()),
        };

        let ignored = self
            .is_ignored(project, revision.id(), &resolved.config, cancel)
            .await?;
        let order_number = self.next_order_number(project, revision.id()).await?;

        let diagnostics = ConfigDiagnostics::from_diagnostics(self.validator.check(&resolved.config))
            .with_carried_warnings(resolved.warnings);
        let serialized = resolved
            .config
            .to_yaml()
            .map_err(VersionBuilderError::ConfigSerialization)?;

        let mut version = Version::from_revision(project, revision, order_number);
        version.set_config(serialized);
        version.set_ignored(ignored);
        if diagnostics.has_errors() {
            version.record_diagnostics(diagnostics.warnings, diagnostics.errors);
            return self.insert_stub(project, version).await;
        }
        version.record_diagnostics(diagnostics.warnings, Vec::new());

        match self
            .expander
            .expand(version, project, &resolved.config)
            .await?
        {
            ExpansionOutcome::Created(created) => {
                self.notify(&created, project).await;
                Ok(BuildOutcome::Expanded(created))
            }
            ExpansionOutcome::AlreadyStored(existing) => Ok(BuildOutcome::Existing(existing)),
            ExpansionOutcome::Contended(candidate) => Ok(BuildOutcome::Contended(candidate)),
        }
    }

    async fn store_stub(
        &self,
        project: &ProjectRef,
        revision: &Revision,
        diagnostics: ConfigDiagnostics,
    ) -> VersionBuilderResult<BuildOutcome> {
        let order_number = self.next_order_number(project, revision.id()).await?;
        let mut version = Version::from_revision(project, revision, order_number);
        version.record_diagnostics(diagnostics.warnings, diagnostics.errors);
        self.insert_stub(project, version).await
    }

    async fn insert_stub(
        &self,
        project: &ProjectRef,
        version: Version,
    ) -> VersionBuilderResult<BuildOutcome> {
        match self.store.versions.insert(&version).await {
            Ok(()) => {
                tracing::warn!(
                    project = %project.identifier,
                    revision = %version.revision(),
                    version_id = %version.id(),
                    errors = ?version.errors(),
                    "stored version without builds because of configuration errors"
                );
                Ok(BuildOutcome::Stub(version))
            }
            Err(err) if err.is_duplicate_revision() => {
                let existing = self
                    .store
                    .versions
                    .find_by_project_and_revision(&project.identifier, version.revision())
                    .await?;
                Ok(BuildOutcome::Existing(existing.unwrap_or(version)))
            }
            Err(VersionRepositoryError::DuplicateOrderNumber {
                project: taken_in,
                order_number,
            }) => Err(consistency_violation(OrderConsistencyError::OrderNumberTaken {
                project: taken_in,
                order_number,
            })),
            Err(err) => Err(err.into()),
        }
    }

    /// Reserves the next order number and checks it against the latest
    /// stored version.
    async fn next_order_number(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
    ) -> VersionBuilderResult<OrderNumber> {
        let candidate = self.store.counter.next(&project.identifier).await?;
        let Some(latest) = self.store.versions.find_latest(&project.identifier).await? else {
            return Ok(candidate);
        };

        if latest.revision() == revision {
            return Err(consistency_violation(
                OrderConsistencyError::DuplicateLatestRevision {
                    project: project.identifier.clone(),
                    revision: revision.clone(),
                },
            ));
        }
        if candidate <= latest.order_number() {
            return Err(consistency_violation(OrderConsistencyError::NonIncreasingOrder {
                project: project.identifier.clone(),
                candidate,
                latest: latest.order_number(),
            }));
        }
        Ok(candidate)
    }

    /// Returns `true` when every changed file matches an ignore rule.
    ///
    /// Invalid rules, fetch failures and timeouts count as "not ignored";
    /// only cancellation is propagated.
    async fn is_ignored(
        &self,
        project: &ProjectRef,
        revision: &RevisionId,
        config: &ProjectConfig,
        cancel: &CancellationToken,
    ) -> VersionBuilderResult<bool> {
        if config.ignore.is_empty() {
            return Ok(false);
        }
        let rules = match IgnoreRules::compile(&config.ignore) {
            Ok(rules) => rules,
            Err(err) => {
                tracing::warn!(project = %project.identifier, error = %err, "skipping ignore check");
                return Ok(false);
            }
        };

        let fetched = interruptible(
            cancel,
            self.fetch_timeout,
            self.revisions.changed_files(project, revision),
        )
        .await;
        match fetched {
            Ok(Ok(files)) => Ok(rules.ignores_all(&files)),
            Ok(Err(err)) => {
                tracing::warn!(
                    project = %project.identifier,
                    revision = %revision,
                    error = %err,
                    "could not list changed files; treating revision as not ignored"
                );
                Ok(false)
            }
            Err(Interrupted::Cancelled) => Err(Interrupted::Cancelled.into()),
            Err(timed_out) => {
                tracing::warn!(
                    project = %project.identifier,
                    revision = %revision,
                    error = %timed_out,
                    "changed-file listing timed out; treating revision as not ignored"
                );
                Ok(false)
            }
        }
    }

    async fn notify(&self, version: &Version, project: &ProjectRef) {
        let Some(hook) = &self.hook else {
            return;
        };
        if let Err(err) = hook.version_created(version, project).await {
            tracing::error!(
                project = %project.identifier,
                version_id = %version.id(),
                error = %err,
                "version hook failed"
            );
        }
    }
}

fn consistency_violation(violation: OrderConsistencyError) -> VersionBuilderError {
    tracing::error!(error = %violation, "version ordering invariant violated");
    violation.into()
}
