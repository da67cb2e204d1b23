//! Step definitions for revision ingestion scenarios.

pub mod when;
pub mod world;
