//! Application services for notification subscriptions.

mod build_break;

pub use build_break::{BuildBreakSubscriptionHook, NotificationError};
