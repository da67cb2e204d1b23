//! Domain model for tracked projects and their build configuration.
//!
//! Project references hold per-project tracking settings; project
//! configurations describe the build variants and tasks declared in the
//! repository at a given revision.

mod config;
mod diagnostic;
mod error;
mod ids;
mod ignore;
mod project_ref;

pub use config::{
    BuildVariant, ParsedProjectConfig, ProjectConfig, TaskDependency, TaskSpec, VariantTask,
};
pub use diagnostic::{ConfigDiagnostics, Diagnostic, DiagnosticLevel};
pub use error::{ConfigParseError, ProjectDomainError};
pub use ids::ProjectId;
pub use ignore::IgnoreRules;
pub use project_ref::{DEFAULT_BRANCH, DEFAULT_REMOTE_PATH, ProjectRef, TrackerErrorFlag};
