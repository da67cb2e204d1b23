//! In-memory order-number counter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::project::domain::ProjectId;
use crate::version::{
    domain::OrderNumber,
    ports::{OrderNumberCounter, OrderNumberError},
};

/// Per-project counter held in process memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderNumberCounter {
    last: Arc<Mutex<HashMap<ProjectId, OrderNumber>>>,
}

impl InMemoryOrderNumberCounter {
    /// Creates a counter with every project starting at one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the last issued number for `project`; the next call returns its
    /// successor.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn reset_to(&self, project: &ProjectId, last: OrderNumber) -> Result<(), OrderNumberError> {
        self.last
            .lock()
            .map_err(|err| OrderNumberError::persistence(std::io::Error::other(err.to_string())))?
            .insert(project.clone(), last);
        Ok(())
    }
}

#[async_trait]
impl OrderNumberCounter for InMemoryOrderNumberCounter {
    async fn next(&self, project: &ProjectId) -> Result<OrderNumber, OrderNumberError> {
        let mut last = self
            .last
            .lock()
            .map_err(|err| OrderNumberError::persistence(std::io::Error::other(err.to_string())))?;
        let next = match last.get(project) {
            Some(current) => current
                .successor()
                .ok_or_else(|| OrderNumberError::Exhausted(project.clone()))?,
            None => OrderNumber::FIRST,
        };
        last.insert(project.clone(), next);
        Ok(next)
    }
}
