//! Build repository behaviour backed by the ingestion schema.

use super::helpers::{PreparedStore, epoch, store};
use pilotis::version::{
    domain::BuildId,
    ports::{BuildRepository, BuildRepositoryError},
};
use rstest::rstest;

#[rstest]
fn builds_and_tasks_are_stored_in_order(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let version = store.version("r1", 1);
    let (windows, windows_tasks) = store.build(&version, "windows", &["compile", "package"]);
    let (linux, linux_tasks) = store.build(&version, "linux", &["compile", "test", "lint"]);
    store
        .block_on(store.builds.insert(&windows, &windows_tasks))
        .expect("insert should succeed");
    store
        .block_on(store.builds.insert(&linux, &linux_tasks))
        .expect("insert should succeed");

    let stored = store
        .block_on(store.builds.find_by_version(version.id()))
        .expect("lookup should succeed");
    assert_eq!(stored, vec![linux.clone(), windows]);

    let tasks = store
        .block_on(store.builds.find_tasks(&linux.id))
        .expect("lookup should succeed");
    let names: Vec<&str> = tasks.iter().map(|task| task.display_name.as_str()).collect();
    assert_eq!(names, ["compile", "test", "lint"]);
}

#[rstest]
fn repeated_build_identifier_is_rejected(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let version = store.version("r1", 1);
    let (build, tasks) = store.build(&version, "linux", &["compile"]);
    store
        .block_on(store.builds.insert(&build, &tasks))
        .expect("first insert should succeed");

    let result = store.block_on(store.builds.insert(&build, &tasks));

    assert!(
        matches!(&result, Err(BuildRepositoryError::DuplicateBuild(id)) if id == &build.id),
        "expected DuplicateBuild, got {result:?}"
    );
    let tasks_after = store
        .block_on(store.builds.find_tasks(&build.id))
        .expect("lookup should succeed");
    assert_eq!(tasks_after.len(), 1);
}

#[rstest]
fn deleting_a_build_removes_its_tasks(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let version = store.version("r1", 1);
    let (build, tasks) = store.build(&version, "linux", &["compile", "test"]);
    store
        .block_on(store.builds.insert(&build, &tasks))
        .expect("insert should succeed");

    store
        .block_on(store.builds.delete(&build.id))
        .expect("delete should succeed");
    store
        .block_on(store.builds.delete(&build.id))
        .expect("deleting a missing build should succeed");

    let found = store
        .block_on(store.builds.find_by_id(&build.id))
        .expect("lookup should succeed");
    assert!(found.is_none());
    let orphaned = store
        .block_on(store.builds.find_tasks(&build.id))
        .expect("lookup should succeed");
    assert!(orphaned.is_empty());
}

#[rstest]
fn activation_flags_the_build_and_its_tasks(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let version = store.version("r1", 1);
    let (build, tasks) = store.build(&version, "linux", &["compile", "test"]);
    store
        .block_on(store.builds.insert(&build, &tasks))
        .expect("insert should succeed");

    store
        .block_on(store.builds.mark_activated(&build.id, epoch()))
        .expect("activation should succeed");

    let stored = store
        .block_on(store.builds.find_by_id(&build.id))
        .expect("lookup should succeed")
        .expect("build is stored");
    assert!(stored.activated);
    let tasks_after = store
        .block_on(store.builds.find_tasks(&build.id))
        .expect("lookup should succeed");
    assert!(tasks_after.iter().all(|task| task.activated));
}

#[rstest]
fn activating_a_missing_build_is_not_found(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let missing = BuildId::from_persisted("pilotis_linux_r9");

    let result = store.block_on(store.builds.mark_activated(&missing, epoch()));

    assert!(
        matches!(&result, Err(BuildRepositoryError::NotFound(id)) if id == &missing),
        "expected NotFound, got {result:?}"
    );
}
