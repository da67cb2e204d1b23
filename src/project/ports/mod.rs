//! Port contracts for project configuration.
//!
//! Ports define infrastructure-agnostic interfaces used by project services.

pub mod config_source;
pub mod validator;

pub use config_source::{ConfigSource, ConfigSourceError, ConfigSourceResult};
#[cfg(test)]
pub use validator::MockProjectValidator;
pub use validator::ProjectValidator;
