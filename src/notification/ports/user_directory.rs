//! User directory port.

use crate::notification::domain::UserProfile;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Read access to user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by identifier.
    async fn find(&self, id: &str) -> UserDirectoryResult<Option<UserProfile>>;
}

/// Errors returned by user directories.
#[derive(Debug, Clone, Error)]
pub enum UserDirectoryError {
    /// Backend failure.
    #[error("user directory error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserDirectoryError {
    /// Wraps a backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}
