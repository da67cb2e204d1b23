//! Port contracts for version ingestion.
//!
//! Ports define infrastructure-agnostic interfaces used by version services.

pub mod build_repository;
pub mod hook;
pub mod order_number;
pub mod repository;

pub use build_repository::{BuildRepository, BuildRepositoryError, BuildRepositoryResult};
pub use hook::{VersionCreatedHook, VersionHookError};
pub use order_number::{OrderNumberCounter, OrderNumberError};
pub use repository::{VersionRepository, VersionRepositoryError, VersionRepositoryResult};
