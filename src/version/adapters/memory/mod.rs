//! In-memory adapters for version ingestion.

mod build;
mod counter;
mod hook;
mod version;

pub use build::InMemoryBuildRepository;
pub use counter::InMemoryOrderNumberCounter;
pub use hook::RecordingVersionHook;
pub use version::InMemoryVersionRepository;
