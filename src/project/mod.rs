//! Project tracking settings and build configuration for Pilotis.
//!
//! Resolves the configuration a project declares at a revision, classifies
//! resolution failures as recoverable or fatal, and validates the result
//! before any builds are expanded. The module follows hexagonal
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
