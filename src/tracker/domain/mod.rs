//! Domain model for repository tracking.

mod error;
mod report;
mod settings;
mod watermark;

pub use error::TrackerSettingsError;
pub use report::{SkipReason, TrackerRunReport};
pub use settings::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_REVISIONS_TO_SEARCH, DEFAULT_NUM_NEW_REVISIONS,
    TrackerSettings,
};
pub use watermark::RepositoryWatermark;
