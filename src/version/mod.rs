//! Version ingestion for Pilotis.
//!
//! Turns project revisions into versions, expands validated versions into
//! builds and tasks with staggered activation times, and activates due
//! builds. Ordering and uniqueness invariants are enforced here; the store
//! backs them with unique constraints. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod tests;
