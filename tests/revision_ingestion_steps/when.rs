//! When steps for revision ingestion BDD scenarios.

use std::sync::Arc;

use super::world::{IngestionWorld, run_async};
use pilotis::tracker::adapters::memory::InMemoryWatermarkRepository;
use rstest_bdd_macros::when;
use tokio_util::sync::CancellationToken;

#[when("the tracker runs")]
fn tracker_runs(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    let project = world.project()?.clone();
    let result = run_async(world.tracker().run(&project, &CancellationToken::new()));
    world.last_run = Some(result);
    Ok(())
}

#[when("the tracker runs again without a watermark")]
fn tracker_runs_from_scratch(world: &mut IngestionWorld) -> Result<(), eyre::Report> {
    world.watermarks = Arc::new(InMemoryWatermarkRepository::new());
    tracker_runs(world)
}
