//! `PostgreSQL` order-number counter.

use super::{IngestionPgPool, schema::order_counters};
use crate::project::domain::ProjectId;
use crate::version::{
    domain::OrderNumber,
    ports::{OrderNumberCounter, OrderNumberError},
};
use async_trait::async_trait;
use diesel::prelude::*;

/// Counter backed by an upserted row per project.
///
/// The increment is a single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`
/// statement, so concurrent callers never receive the same number.
#[derive(Debug, Clone)]
pub struct PostgresOrderNumberCounter {
    pool: IngestionPgPool,
}

impl PostgresOrderNumberCounter {
    /// Creates a counter from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IngestionPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderNumberCounter for PostgresOrderNumberCounter {
    async fn next(&self, project: &ProjectId) -> Result<OrderNumber, OrderNumberError> {
        let pool = self.pool.clone();
        let project_key = project.as_str().to_owned();
        let issued = tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(OrderNumberError::persistence)?;
            diesel::insert_into(order_counters::table)
                .values((
                    order_counters::project_id.eq(project_key.as_str()),
                    order_counters::last_value.eq(1_i64),
                ))
                .on_conflict(order_counters::project_id)
                .do_update()
                .set(order_counters::last_value.eq(order_counters::last_value + 1_i64))
                .returning(order_counters::last_value)
                .get_result::<i64>(&mut connection)
                .map_err(OrderNumberError::persistence)
        })
        .await
        .map_err(OrderNumberError::persistence)??;

        let value = u64::try_from(issued).map_err(OrderNumberError::persistence)?;
        OrderNumber::new(value).map_err(|_invalid| OrderNumberError::Exhausted(project.clone()))
    }
}
