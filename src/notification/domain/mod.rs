//! Domain model for notification subscriptions.

mod subscription;
mod user;

pub use subscription::{
    BUILD_BREAK_TRIGGER, RESOURCE_TYPE_VERSION, Selector, Subscriber, Subscription,
    SubscriptionId, VERSION_REQUESTER,
};
pub use user::{NotificationPreference, UserProfile};
