//! Application services for repository tracking.

mod repo_tracker;

pub use repo_tracker::{RepoTracker, RepoTrackerError, RepoTrackerResult};
