//! Build-break notification subscriptions.
//!
//! When a version is fully expanded, project administrators are subscribed to
//! build-break notifications for it, unless the commit author already has a
//! personal build-break subscription. Delivery is out of scope; this context
//! only records who should be told.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
