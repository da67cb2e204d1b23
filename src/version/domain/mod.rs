//! Domain model for versions, builds and tasks.
//!
//! A version is the ingestion unit for one project revision. It is either a
//! stub carrying configuration errors, or an expanded version owning one
//! build per enabled build variant, each build owning its tasks.

mod build;
mod error;
mod ids;
mod revision;
mod task_table;
mod version;

pub use build::{Build, Task};
pub use error::{OrderConsistencyError, VersionDomainError};
pub use ids::{BuildId, OrderNumber, RevisionId, TaskId, VersionId, clean_name};
pub use revision::Revision;
pub use task_table::TaskIdTable;
pub use version::{BuildStatus, PersistedVersionData, Version, VersionStatus};
