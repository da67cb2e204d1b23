//! User notification settings consulted by the build-break hook.

use serde::{Deserialize, Serialize};

use super::{Subscriber, SubscriptionId};

/// Channel a user wants build-break notifications delivered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPreference {
    /// Deliver by email.
    Email,
    /// Deliver by Slack direct message.
    Slack,
}

/// The parts of a user account relevant to notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier; also the external author id on revisions.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Slack username, when linked.
    #[serde(default)]
    pub slack_username: Option<String>,
    /// Preferred build-break channel; `None` opts out.
    #[serde(default)]
    pub build_break: Option<NotificationPreference>,
    /// The user's own build-break subscription, if they created one.
    #[serde(default)]
    pub build_break_subscription: Option<SubscriptionId>,
}

impl UserProfile {
    /// Creates a profile with no notification preferences.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            slack_username: None,
            build_break: None,
            build_break_subscription: None,
        }
    }

    /// Sets the build-break channel.
    #[must_use]
    pub const fn with_build_break(mut self, preference: NotificationPreference) -> Self {
        self.build_break = Some(preference);
        self
    }

    /// Links a Slack username.
    #[must_use]
    pub fn with_slack_username(mut self, username: impl Into<String>) -> Self {
        self.slack_username = Some(username.into());
        self
    }

    /// Records the user's personal build-break subscription.
    #[must_use]
    pub const fn with_build_break_subscription(mut self, id: SubscriptionId) -> Self {
        self.build_break_subscription = Some(id);
        self
    }

    /// Returns `true` when the user manages their own build-break alerts.
    #[must_use]
    pub const fn has_build_break_subscription(&self) -> bool {
        self.build_break_subscription.is_some()
    }

    /// Maps the build-break preference to a delivery target.
    ///
    /// Returns `None` when the user has no preference. A Slack preference
    /// without a linked username falls back to the `@`-prefixed user id.
    #[must_use]
    pub fn build_break_subscriber(&self) -> Option<Subscriber> {
        match self.build_break? {
            NotificationPreference::Email => Some(Subscriber::Email(self.email.clone())),
            NotificationPreference::Slack => Some(Subscriber::Slack(format!(
                "@{}",
                self.slack_username.as_deref().unwrap_or(&self.id)
            ))),
        }
    }
}
