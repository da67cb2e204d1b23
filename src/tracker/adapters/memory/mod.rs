//! In-memory adapters for repository tracking.

mod revision_source;
mod watermark;

pub use revision_source::InMemoryRevisionSource;
pub use watermark::InMemoryWatermarkRepository;
