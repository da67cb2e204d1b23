//! Port contracts for repository tracking.

pub mod revision_source;
pub mod watermark;

pub use revision_source::{RevisionSource, RevisionSourceError, RevisionSourceResult};
pub use watermark::{WatermarkRepository, WatermarkRepositoryError, WatermarkRepositoryResult};
