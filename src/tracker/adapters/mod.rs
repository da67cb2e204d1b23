//! Adapter implementations for repository tracking ports.

pub mod memory;
pub mod postgres;
