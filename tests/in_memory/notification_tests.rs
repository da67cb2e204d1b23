//! Build-break subscriptions created through the version hook.

use std::sync::Arc;

use super::helpers::{Stack, stack};
use pilotis::notification::{
    adapters::memory::{InMemorySubscriptionRepository, InMemoryUserDirectory},
    domain::{NotificationPreference, Subscriber, UserProfile},
    services::BuildBreakSubscriptionHook,
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn directory(users: impl IntoIterator<Item = UserProfile>) -> Arc<InMemoryUserDirectory> {
    let directory = Arc::new(InMemoryUserDirectory::new());
    for user in users {
        directory.insert(user).expect("user should insert");
    }
    directory
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admins_are_subscribed_once_per_project(stack: Stack) {
    let users = directory([
        UserProfile::new("grace", "grace@example.com"),
        UserProfile::new("alan", "alan@example.com")
            .with_build_break(NotificationPreference::Email),
    ]);
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let hook = Arc::new(BuildBreakSubscriptionHook::new(users, subscriptions.clone()));
    let project = stack
        .project
        .clone()
        .with_build_break_admins(["alan".to_owned()]);
    stack.push(&["a1", "a2"]);

    stack
        .tracker_with(stack.builder().with_hook(hook))
        .run(&project, &CancellationToken::new())
        .await
        .expect("run should succeed");

    let stored = subscriptions.all().expect("list subscriptions");
    assert_eq!(stored.len(), 1);
    assert!(stored.iter().all(|subscription| {
        subscription.subscriber == Subscriber::Email("alan@example.com".to_owned())
    }));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn hook_failures_do_not_block_ingestion(stack: Stack) {
    let users = directory([UserProfile::new("grace", "grace@example.com")]);
    users.fail_lookup("grace").expect("scripting should succeed");
    let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
    let hook = Arc::new(BuildBreakSubscriptionHook::new(users, subscriptions.clone()));
    let project = stack
        .project
        .clone()
        .with_build_break_admins(["nobody".to_owned()]);
    stack.push(&["a1"]);

    let report = stack
        .tracker_with(stack.builder().with_hook(hook))
        .run(&project, &CancellationToken::new())
        .await
        .expect("hook failure should be tolerated");

    assert_eq!(report.advanced_to.map(|id| id.to_string()), Some("a1".to_owned()));
    assert!(subscriptions.all().expect("list subscriptions").is_empty());
}
