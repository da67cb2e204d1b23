//! Application services for version ingestion.

mod activator;
mod builder;
mod expander;

pub use activator::{ActivatedBuild, ActivationError, ProjectActivator};
pub use builder::{
    BuildOutcome, IngestionStore, VersionBuilder, VersionBuilderError, VersionBuilderResult,
};
pub use expander::{BuildExpander, BuildExpansionError, ExpansionOutcome};
