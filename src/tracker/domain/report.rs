//! Outcome of one tracker run.

use crate::version::domain::{RevisionId, VersionId};

/// Why a run did not poll the revision source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Tracking is disabled for the project.
    Disabled,
    /// A tracker error is recorded against the project.
    TrackerError,
    /// The revision source failed or timed out.
    PollFailed,
}

/// Summary of a tracker run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerRunReport {
    /// Set when polling was skipped.
    pub skipped: Option<SkipReason>,
    /// Number of revisions returned by the revision source.
    pub revisions_seen: usize,
    /// Newest version touched by this run.
    pub newest_version: Option<VersionId>,
    /// Watermark position after the run, when it moved.
    pub advanced_to: Option<RevisionId>,
    /// Number of builds activated after ingestion.
    pub builds_activated: usize,
}

impl TrackerRunReport {
    /// Report for a run that did not poll.
    #[must_use]
    pub const fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            revisions_seen: 0,
            newest_version: None,
            advanced_to: None,
            builds_activated: 0,
        }
    }
}
