//! Repository tracking.
//!
//! Polls each project's revision history, hands new revisions to the
//! version builder and keeps a per-project watermark of the newest revision
//! fully ingested.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
