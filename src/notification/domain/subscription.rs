//! Subscriptions to version events.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::project::domain::ProjectId;

/// Resource type of version-scoped subscriptions.
pub const RESOURCE_TYPE_VERSION: &str = "VERSION";

/// Trigger fired when a task of a previously passing variant fails.
pub const BUILD_BREAK_TRIGGER: &str = "build-break";

/// Requester recorded on versions created by repository tracking.
pub const VERSION_REQUESTER: &str = "gitter_request";

/// Unique identifier for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a new random subscription identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a subscription identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filter narrowing which events a subscription matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    /// Selector type, e.g. `project`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Value to match.
    pub data: String,
}

impl Selector {
    /// Creates a selector.
    #[must_use]
    pub fn new(kind: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            data: data.into(),
        }
    }
}

/// Delivery target of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "lowercase")]
pub enum Subscriber {
    /// Email address.
    Email(String),
    /// Slack channel or `@user`.
    Slack(String),
}

/// A request to be notified about matching events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscription identifier.
    pub id: SubscriptionId,
    /// Resource type the subscription watches.
    pub resource_type: String,
    /// Event trigger.
    pub trigger: String,
    /// All selectors must match.
    pub selectors: Vec<Selector>,
    /// Delivery target.
    pub subscriber: Subscriber,
}

impl Subscription {
    /// Creates a build-break subscription for tracked versions of `project`.
    #[must_use]
    pub fn build_break(project: &ProjectId, subscriber: Subscriber) -> Self {
        Self {
            id: SubscriptionId::new(),
            resource_type: RESOURCE_TYPE_VERSION.to_owned(),
            trigger: BUILD_BREAK_TRIGGER.to_owned(),
            selectors: vec![
                Selector::new("object", "task"),
                Selector::new("project", project.as_str()),
                Selector::new("requester", VERSION_REQUESTER),
            ],
            subscriber,
        }
    }

    /// Returns `true` when both subscriptions describe the same delivery,
    /// ignoring identifiers.
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type
            && self.trigger == other.trigger
            && self.selectors == other.selectors
            && self.subscriber == other.subscriber
    }
}
