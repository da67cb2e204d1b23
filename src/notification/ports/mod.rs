//! Port contracts for notification subscriptions.

pub mod subscription;
pub mod user_directory;

pub use subscription::{
    SubscriptionRepository, SubscriptionRepositoryError, SubscriptionRepositoryResult,
};
pub use user_directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};
