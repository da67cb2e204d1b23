//! Adapter implementations for version ingestion ports.

pub mod memory;
pub mod postgres;
