//! Build-break subscriptions for newly expanded versions.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::notification::{
    domain::Subscription,
    ports::{
        SubscriptionRepository, SubscriptionRepositoryError, UserDirectory, UserDirectoryError,
    },
};
use crate::project::domain::ProjectRef;
use crate::version::{
    domain::Version,
    ports::{VersionCreatedHook, VersionHookError},
};

/// Failures while subscribing users to build breaks.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// A user lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
    /// A project admin has no user account.
    #[error("user {0} does not exist")]
    UnknownUser(String),
    /// A subscription could not be stored.
    #[error(transparent)]
    Subscriptions(#[from] SubscriptionRepositoryError),
    /// Several of the above.
    #[error("{} notification errors: {}", .0.len(), render(.0))]
    Multiple(Vec<NotificationError>),
}

fn render(errors: &[NotificationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl NotificationError {
    /// Collapses accumulated errors, returning `None` when there are none.
    fn from_accumulated(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Multiple(errors)),
        }
    }
}

/// Subscribes project admins to build-break notifications for new versions.
///
/// Nothing is subscribed when the commit author manages their own
/// build-break alerts or the project has build-failure notifications off.
#[derive(Clone)]
pub struct BuildBreakSubscriptionHook {
    users: Arc<dyn UserDirectory>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl BuildBreakSubscriptionHook {
    /// Creates the hook.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserDirectory>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            users,
            subscriptions,
        }
    }

    /// Creates the subscriptions for `version`.
    ///
    /// # Errors
    ///
    /// Returns every lookup and storage failure together; admins that could
    /// be processed are still subscribed.
    pub async fn subscribe(
        &self,
        version: &Version,
        project: &ProjectRef,
    ) -> Result<Vec<Subscription>, NotificationError> {
        let mut errors = Vec::new();
        if let Some(author_id) = version.author_external_id() {
            match self.users.find(author_id).await {
                Ok(Some(author)) if author.has_build_break_subscription() => {
                    return Ok(Vec::new());
                }
                Ok(_) => {}
                Err(err) => errors.push(err.into()),
            }
        }

        if !project.notify_on_build_failure {
            return NotificationError::from_accumulated(errors).map_or(Ok(Vec::new()), Err);
        }

        let mut created = Vec::new();
        for admin in &project.admins {
            let profile = match self.users.find(admin).await {
                Ok(Some(profile)) => profile,
                Ok(None) => {
                    errors.push(NotificationError::UnknownUser(admin.clone()));
                    continue;
                }
                Err(err) => {
                    errors.push(err.into());
                    continue;
                }
            };
            let Some(subscriber) = profile.build_break_subscriber() else {
                continue;
            };
            let subscription = Subscription::build_break(&project.identifier, subscriber);
            match self.subscriptions.upsert(&subscription).await {
                Ok(stored) => created.push(stored),
                Err(err) => errors.push(err.into()),
            }
        }

        tracing::debug!(
            project = %project.identifier,
            version_id = %version.id(),
            subscriptions = created.len(),
            "build-break subscriptions recorded"
        );
        NotificationError::from_accumulated(errors).map_or(Ok(created), Err)
    }
}

#[async_trait]
impl VersionCreatedHook for BuildBreakSubscriptionHook {
    async fn version_created(
        &self,
        version: &Version,
        project: &ProjectRef,
    ) -> Result<(), VersionHookError> {
        self.subscribe(version, project)
            .await
            .map(|_subscriptions| ())
            .map_err(VersionHookError::new)
    }
}
