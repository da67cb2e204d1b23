//! Tracker runs over scripted revision histories.

use std::sync::Arc;

use super::helpers::{CONFIG, Stack, revision, revision_id, stack};
use mockable::DefaultClock;
use pilotis::{
    project::ports::ConfigSourceError,
    tracker::{
        adapters::memory::InMemoryWatermarkRepository,
        services::{RepoTracker, RepoTrackerError},
    },
    version::{
        domain::VersionId,
        services::{ProjectActivator, VersionBuilderError},
    },
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

fn ids(stack: &Stack) -> Vec<VersionId> {
    stack
        .versions()
        .iter()
        .map(|version| version.id().clone())
        .collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rerunning_from_scratch_stores_nothing_new(stack: Stack) {
    stack.push(&["a1", "a2", "a3"]);
    stack
        .tracker()
        .run(&stack.project, &CancellationToken::new())
        .await
        .expect("first run should succeed");
    let first_ids = ids(&stack);

    let fresh_watermarks = Arc::new(InMemoryWatermarkRepository::new());
    let replay = RepoTracker::new(
        stack.builder(),
        ProjectActivator::new(
            stack.versions.clone(),
            stack.builds.clone(),
            Arc::new(DefaultClock),
        ),
        stack.revisions.clone(),
        fresh_watermarks,
        Arc::new(DefaultClock),
    );
    let report = replay
        .run(&stack.project, &CancellationToken::new())
        .await
        .expect("replay should succeed");

    assert_eq!(report.revisions_seen, 3);
    assert_eq!(ids(&stack), first_ids);
    assert_eq!(stack.versions.insert_count().expect("inserts"), 3);
    assert_eq!(stack.builds.build_count().expect("builds"), 6);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn order_numbers_increase_across_runs(stack: Stack) {
    let tracker = stack.tracker();
    let cancel = CancellationToken::new();
    stack.push(&["a1", "a2"]);
    tracker.run(&stack.project, &cancel).await.expect("run");
    stack
        .configs
        .set_failure(
            &stack.project.identifier,
            &revision_id("b1"),
            ConfigSourceError::Rejected("422 unprocessable".to_owned()),
        )
        .expect("scripting should succeed");
    stack.push(&["b1", "b2"]);
    tracker.run(&stack.project, &cancel).await.expect("run");

    let numbers: Vec<u64> = stack
        .versions()
        .iter()
        .map(|version| version.order_number().value())
        .collect();
    assert_eq!(numbers, [1, 2, 3, 4]);
    assert!(stack.version("b1").is_stub());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_configuration_is_isolated_to_its_revision(stack: Stack) {
    stack
        .configs
        .set_failure(
            &stack.project.identifier,
            &revision_id("a2"),
            ConfigSourceError::NotFound {
                path: stack.project.remote_path.clone(),
                revision: revision_id("a2"),
            },
        )
        .expect("scripting should succeed");
    stack.push(&["a1", "a2", "a3"]);

    let report = stack
        .tracker()
        .run(&stack.project, &CancellationToken::new())
        .await
        .expect("run should succeed");

    assert_eq!(report.advanced_to, Some(revision_id("a3")));
    let stub = stack.version("a2");
    assert!(stub.is_stub());
    assert!(stub.build_ids().is_empty());
    for expanded in ["a1", "a3"] {
        assert_eq!(stack.version(expanded).build_ids().len(), 2);
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn transport_failure_aborts_batch_and_is_retried(stack: Stack) {
    stack.push(&["a1"]);
    let tracker = stack.tracker();
    let cancel = CancellationToken::new();
    tracker.run(&stack.project, &cancel).await.expect("run");
    stack
        .configs
        .set_failure(
            &stack.project.identifier,
            &revision_id("b2"),
            ConfigSourceError::transport(std::io::Error::other("connection refused")),
        )
        .expect("scripting should succeed");
    stack.push(&["b1", "b2", "b3"]);

    let result = tracker.run(&stack.project, &cancel).await;

    assert!(matches!(
        result,
        Err(RepoTrackerError::Builder(VersionBuilderError::Config(_)))
    ));
    let stored: Vec<String> = stack
        .versions()
        .iter()
        .map(|version| version.revision().to_string())
        .collect();
    assert_eq!(stored, ["a1", "b1"]);

    stack
        .configs
        .set_document(
            &stack.project.identifier,
            &revision_id("b2"),
            CONFIG,
        )
        .expect("scripting should succeed");
    let report = tracker
        .run(&stack.project, &cancel)
        .await
        .expect("retry should succeed");
    assert_eq!(report.revisions_seen, 3);
    assert_eq!(report.advanced_to, Some(revision_id("b3")));
    assert_eq!(stack.versions().len(), 4);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn builder_returns_same_versions_for_same_batch(stack: Stack) {
    let builder = stack.builder();
    let batch = [revision("a2", 1), revision("a1", 0)];
    let cancel = CancellationToken::new();

    let first = builder
        .store_revisions(&stack.project, &batch, &cancel)
        .await
        .expect("first pass");
    let second = builder
        .store_revisions(&stack.project, &batch, &cancel)
        .await
        .expect("second pass");

    assert_eq!(first, second);
    assert_eq!(stack.versions.insert_count().expect("inserts"), 2);
}
