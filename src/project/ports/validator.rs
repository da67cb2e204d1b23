//! Validator port for project configuration checks.

use crate::project::domain::{Diagnostic, ProjectConfig};

/// Port for project configuration validation.
///
/// Implementations should collect every finding rather than stopping at the
/// first, and must be stateless and thread-safe.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectValidator: Send + Sync {
    /// Checks a configuration and returns its diagnostics.
    fn check(&self, config: &ProjectConfig) -> Vec<Diagnostic>;
}
