//! In-memory user directory and subscription repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{Subscription, UserProfile},
    ports::{
        SubscriptionRepository, SubscriptionRepositoryError, SubscriptionRepositoryResult,
        UserDirectory, UserDirectoryError, UserDirectoryResult,
    },
};

/// User directory backed by a map of profiles.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    state: Arc<RwLock<InMemoryUserState>>,
}

#[derive(Debug, Default)]
struct InMemoryUserState {
    users: HashMap<String, UserProfile>,
    unavailable: HashSet<String>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a profile.
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn insert(&self, user: UserProfile) -> UserDirectoryResult<()> {
        self.state
            .write()
            .map_err(|err| UserDirectoryError::backend(std::io::Error::other(err.to_string())))?
            .users
            .insert(user.id.clone(), user);
        Ok(())
    }

    /// Makes lookups of `id` fail.
    ///
    /// # Errors
    ///
    /// Returns a backend error when lock acquisition fails.
    pub fn fail_lookup(&self, id: impl Into<String>) -> UserDirectoryResult<()> {
        self.state
            .write()
            .map_err(|err| UserDirectoryError::backend(std::io::Error::other(err.to_string())))?
            .unavailable
            .insert(id.into());
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find(&self, id: &str) -> UserDirectoryResult<Option<UserProfile>> {
        let state = self
            .state
            .read()
            .map_err(|err| UserDirectoryError::backend(std::io::Error::other(err.to_string())))?;
        if state.unavailable.contains(id) {
            return Err(UserDirectoryError::backend(std::io::Error::other(format!(
                "user {id} unavailable"
            ))));
        }
        Ok(state.users.get(id).cloned())
    }
}

/// Subscription repository held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<Vec<Subscription>>>,
}

impl InMemorySubscriptionRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored subscription in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn all(&self) -> SubscriptionRepositoryResult<Vec<Subscription>> {
        self.subscriptions
            .read()
            .map(|stored| stored.clone())
            .map_err(|err| {
                SubscriptionRepositoryError::persistence(std::io::Error::other(err.to_string()))
            })
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn upsert(
        &self,
        subscription: &Subscription,
    ) -> SubscriptionRepositoryResult<Subscription> {
        let mut stored = self.subscriptions.write().map_err(|err| {
            SubscriptionRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if let Some(existing) = stored
            .iter()
            .find(|candidate| candidate.same_target(subscription))
        {
            return Ok(existing.clone());
        }
        stored.push(subscription.clone());
        Ok(subscription.clone())
    }
}
