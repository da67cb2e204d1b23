//! Per-project order-number counter port.

use crate::project::domain::ProjectId;
use crate::version::domain::OrderNumber;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Atomic per-project sequence.
///
/// Successive calls for one project never repeat a number or go backwards;
/// gaps are allowed.
#[async_trait]
pub trait OrderNumberCounter: Send + Sync {
    /// Reserves the next order number for `project`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] when the counter cannot be advanced.
    async fn next(&self, project: &ProjectId) -> Result<OrderNumber, OrderNumberError>;
}

/// Errors returned by order-number counters.
#[derive(Debug, Clone, Error)]
pub enum OrderNumberError {
    /// The counter cannot produce another valid order number.
    #[error("order number counter exhausted for project {0}")]
    Exhausted(ProjectId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl OrderNumberError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
