//! Unit tests for the version context.

pub(crate) mod support;
