//! The version builder and activator running over the `PostgreSQL` stores.

use super::helpers::{PreparedStore, commit, revision_id, store};
use mockable::DefaultClock;
use pilotis::{
    project::{adapters::InMemoryConfigSource, services::ConfigResolver},
    tracker::adapters::memory::InMemoryRevisionSource,
    version::{
        adapters::postgres::{
            PostgresBuildRepository, PostgresOrderNumberCounter, PostgresVersionRepository,
        },
        ports::{BuildRepository, VersionRepository},
        services::{BuildOutcome, IngestionStore, ProjectActivator, VersionBuilder},
    },
};
use rstest::rstest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CONFIG: &str = "\
buildvariants:
  - name: linux
    tasks:
      - name: compile
      - name: test
  - name: windows
    tasks:
      - name: compile
tasks:
  - name: compile
  - name: test
    depends_on:
      - name: compile
";

type PgBuilder = VersionBuilder<
    PostgresVersionRepository,
    PostgresBuildRepository,
    PostgresOrderNumberCounter,
    DefaultClock,
>;

fn builder(store: &PreparedStore, ids: &[&str]) -> (PgBuilder, Arc<InMemoryConfigSource>) {
    let project = &store.project.identifier;
    let configs = Arc::new(InMemoryConfigSource::new());
    configs
        .set_default_document(project, CONFIG)
        .expect("scripting should succeed");
    let revisions = Arc::new(InMemoryRevisionSource::new());
    for (minutes, id) in (0_i64..).zip(ids) {
        revisions
            .push(project, commit(id, minutes))
            .expect("scripting should succeed");
        revisions
            .set_changed_files(project, &revision_id(id), ["src/main.rs"])
            .expect("scripting should succeed");
    }
    let builder = VersionBuilder::new(
        IngestionStore::new(
            Arc::clone(&store.versions),
            Arc::clone(&store.builds),
            Arc::clone(&store.counter),
        ),
        ConfigResolver::new(configs.clone()),
        revisions,
        Arc::new(DefaultClock),
    );
    (builder, configs)
}

#[rstest]
fn batch_is_stored_and_newest_builds_activated(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let (builder, _configs) = builder(&store, &["r1", "r2"]);
    let cancel = CancellationToken::new();

    let newest = store
        .block_on(builder.store_revisions(
            &store.project,
            &[commit("r2", 1), commit("r1", 0)],
            &cancel,
        ))
        .expect("batch should succeed")
        .expect("batch is not empty");
    assert_eq!(newest.revision().as_str(), "r2");
    assert_eq!(newest.order_number().value(), 2);

    let builds = store
        .block_on(store.builds.find_by_version(newest.id()))
        .expect("lookup should succeed");
    let variants: Vec<&str> = builds.iter().map(|build| build.build_variant.as_str()).collect();
    assert_eq!(variants, ["linux", "windows"]);
    let linux = builds.first().expect("linux build");
    let tasks = store
        .block_on(store.builds.find_tasks(&linux.id))
        .expect("lookup should succeed");
    let test_task = tasks.get(1).expect("test task");
    let compile_task = tasks.first().expect("compile task");
    assert_eq!(test_task.depends_on, vec![compile_task.id.clone()]);

    let activator = ProjectActivator::new(
        Arc::clone(&store.versions),
        Arc::clone(&store.builds),
        Arc::new(DefaultClock),
    );
    let activated = store
        .block_on(activator.activate(&store.project))
        .expect("activation should succeed");
    assert_eq!(activated.len(), 2);
    assert!(activated.iter().all(|build| &build.version_id == newest.id()));

    let again = store
        .block_on(activator.activate(&store.project))
        .expect("activation should succeed");
    assert!(again.is_empty());

    let oldest = store
        .block_on(
            store
                .versions
                .find_by_project_and_revision(&store.project.identifier, &revision_id("r1")),
        )
        .expect("lookup should succeed")
        .expect("r1 is stored");
    assert!(oldest.build_statuses().iter().all(|status| !status.activated));
}

#[rstest]
fn stored_revision_is_returned_unchanged(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let (builder, _configs) = builder(&store, &["r1"]);
    let cancel = CancellationToken::new();

    let first = store
        .block_on(builder.build(&store.project, &commit("r1", 0), &cancel))
        .expect("build should succeed");
    let second = store
        .block_on(builder.build(&store.project, &commit("r1", 0), &cancel))
        .expect("build should succeed");

    assert!(matches!(first, BuildOutcome::Expanded(_)));
    assert!(
        matches!(&second, BuildOutcome::Existing(version) if version == first.version()),
        "expected the stored version, got {second:?}"
    );
}

#[rstest]
fn malformed_configuration_stores_a_stub(store: Option<PreparedStore>) {
    let Some(store) = store else { return };
    let (builder, configs) = builder(&store, &["r1"]);
    configs
        .set_document(&store.project.identifier, &revision_id("r1"), "buildvariants: [")
        .expect("scripting should succeed");

    let outcome = store
        .block_on(builder.build(&store.project, &commit("r1", 0), &CancellationToken::new()))
        .expect("build should succeed");

    let BuildOutcome::Stub(stub) = outcome else {
        panic!("expected a stub, got {outcome:?}");
    };
    assert!(!stub.errors().is_empty());
    let builds = store
        .block_on(store.builds.find_by_version(stub.id()))
        .expect("lookup should succeed");
    assert!(builds.is_empty());
    let stored = store
        .block_on(store.versions.find_by_id(stub.id()))
        .expect("lookup should succeed");
    assert_eq!(stored, Some(stub));
}
