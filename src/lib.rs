//! Pilotis: revision ingestion for a continuous-integration orchestrator.
//!
//! This crate turns a stream of source-control revisions for a tracked
//! project into a persisted graph of schedulable work (versions, builds and
//! tasks). Ingestion is idempotent per revision, orders versions with a
//! strictly increasing per-project order number, and staggers build-variant
//! activation using each variant's batch time.
//!
//! # Architecture
//!
//! Pilotis follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, VCS, etc.)
//!
//! # Modules
//!
//! - [`project`]: Project tracking settings, build configuration parsing,
//!   validation and configuration resolution
//! - [`version`]: Versions, builds and tasks, plus the builder, expander and
//!   activator services
//! - [`tracker`]: Per-project polling orchestration and watermarks
//! - [`notification`]: Build-break subscriptions created for new versions
//! - [`interrupt`]: Cancellation and timeout guards for external calls

pub mod interrupt;
pub mod notification;
pub mod project;
pub mod tracker;
pub mod version;
