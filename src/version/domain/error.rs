//! Error types for version domain validation and ordering.

use super::{OrderNumber, RevisionId};
use crate::project::domain::ProjectId;
use thiserror::Error;

/// Errors returned while constructing version domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionDomainError {
    /// The revision identifier is empty or malformed.
    #[error("invalid revision identifier '{0}'")]
    InvalidRevisionId(String),

    /// The order number is outside the supported range.
    #[error("invalid order number {0}, expected a positive integer")]
    InvalidOrderNumber(u64),

    /// The version status string is unknown.
    #[error("unknown version status: {0}")]
    UnknownStatus(String),
}

/// Violations of the per-project version ordering invariants.
///
/// These are fatal: they indicate that two writers raced on the same project
/// or that the order-number counter moved backwards, and are never corrected
/// silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderConsistencyError {
    /// The revision equals the revision of the latest stored version.
    #[error("refusing to add a version for project {project} with duplicate revision {revision}")]
    DuplicateLatestRevision {
        /// Project identifier.
        project: ProjectId,
        /// Revision already held by the latest version.
        revision: RevisionId,
    },

    /// The candidate order number does not exceed the latest stored one.
    #[error(
        "order number {candidate} for project {project} is not greater than latest stored {latest}"
    )]
    NonIncreasingOrder {
        /// Project identifier.
        project: ProjectId,
        /// Order number proposed for the new version.
        candidate: OrderNumber,
        /// Order number of the latest stored version.
        latest: OrderNumber,
    },

    /// The store rejected the order number as already taken.
    #[error("order number {order_number} is already taken in project {project}")]
    OrderNumberTaken {
        /// Project identifier.
        project: ProjectId,
        /// Conflicting order number.
        order_number: OrderNumber,
    },
}
