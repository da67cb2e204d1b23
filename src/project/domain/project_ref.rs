//! Per-project tracking settings.

use super::{BuildVariant, ProjectId};
use serde::{Deserialize, Serialize};

/// Default repository path of the project configuration file.
pub const DEFAULT_REMOTE_PATH: &str = ".pilotis.yml";

/// Default tracked branch.
pub const DEFAULT_BRANCH: &str = "main";

/// Tracker failure recorded against a project by an outside component.
///
/// While `exists` is set, polling is suppressed for the project. Clearing the
/// flag is the responsibility of whichever component set it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerErrorFlag {
    /// Whether a tracker error is currently recorded.
    pub exists: bool,
    /// Revision the tracker could not find when the error was recorded.
    #[serde(default)]
    pub merge_base_revision: Option<String>,
}

/// Tracking settings for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    /// Project identifier.
    pub identifier: ProjectId,
    /// Repository owner on the hosting service.
    #[serde(default)]
    pub owner: String,
    /// Repository name on the hosting service.
    #[serde(default)]
    pub repo: String,
    /// Tracked branch.
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Whether the tracker runs for this project.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Repository path of the configuration file fetched per revision.
    #[serde(default = "default_remote_path")]
    pub remote_path: String,
    /// Local configuration snapshot path, used instead of `remote_path`.
    #[serde(default)]
    pub local_config: Option<String>,
    /// Default minutes between activations of the same build variant.
    #[serde(default)]
    pub batch_time_minutes: u32,
    /// Whether admins are subscribed to build-break notifications.
    #[serde(default)]
    pub notify_on_build_failure: bool,
    /// Administrator user identifiers.
    #[serde(default)]
    pub admins: Vec<String>,
    /// Tracker failure recorded against the project.
    #[serde(default)]
    pub tracker_error: Option<TrackerErrorFlag>,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_owned()
}

const fn default_enabled() -> bool {
    true
}

fn default_remote_path() -> String {
    DEFAULT_REMOTE_PATH.to_owned()
}

impl ProjectRef {
    /// Creates enabled settings with defaults for every optional field.
    #[must_use]
    pub fn new(identifier: ProjectId) -> Self {
        Self {
            identifier,
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            enabled: true,
            remote_path: default_remote_path(),
            local_config: None,
            batch_time_minutes: 0,
            notify_on_build_failure: false,
            admins: Vec::new(),
            tracker_error: None,
        }
    }

    /// Sets the hosting-service repository coordinates.
    #[must_use]
    pub fn with_repository(
        mut self,
        owner: impl Into<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self.branch = branch.into();
        self
    }

    /// Enables or disables tracking.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the remote configuration path.
    #[must_use]
    pub fn with_remote_path(mut self, path: impl Into<String>) -> Self {
        self.remote_path = path.into();
        self
    }

    /// Uses a local configuration snapshot instead of the remote file.
    #[must_use]
    pub fn with_local_config(mut self, path: impl Into<String>) -> Self {
        self.local_config = Some(path.into());
        self
    }

    /// Sets the project-wide default batch time.
    #[must_use]
    pub const fn with_batch_time(mut self, minutes: u32) -> Self {
        self.batch_time_minutes = minutes;
        self
    }

    /// Enables build-break notifications for the given admins.
    #[must_use]
    pub fn with_build_break_admins(mut self, admins: impl IntoIterator<Item = String>) -> Self {
        self.notify_on_build_failure = true;
        self.admins = admins.into_iter().collect();
        self
    }

    /// Records a tracker error against the project.
    #[must_use]
    pub fn with_tracker_error(mut self, flag: TrackerErrorFlag) -> Self {
        self.tracker_error = Some(flag);
        self
    }

    /// Returns `true` when a tracker error suppresses polling.
    #[must_use]
    pub fn has_tracker_error(&self) -> bool {
        self.tracker_error.as_ref().is_some_and(|flag| flag.exists)
    }

    /// Returns the batch time for a variant, falling back to the project
    /// default when the variant declares none.
    #[must_use]
    pub fn batch_time_for(&self, variant: &BuildVariant) -> u32 {
        variant.batch_time.unwrap_or(self.batch_time_minutes)
    }

    /// Returns the configuration path used for diagnostics.
    #[must_use]
    pub fn config_path(&self) -> &str {
        self.local_config.as_deref().unwrap_or(&self.remote_path)
    }
}
