//! Subscription repository port.

use crate::notification::domain::Subscription;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for subscription repository operations.
pub type SubscriptionRepositoryResult<T> = Result<T, SubscriptionRepositoryError>;

/// Persistence of notification subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Stores `subscription`, or returns the existing subscription with the
    /// same target.
    async fn upsert(&self, subscription: &Subscription) -> SubscriptionRepositoryResult<Subscription>;
}

/// Errors returned by subscription repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SubscriptionRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SubscriptionRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
