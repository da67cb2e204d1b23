//! Unit tests for repository tracking.
