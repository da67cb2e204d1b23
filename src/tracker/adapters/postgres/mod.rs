//! `PostgreSQL` adapters for repository tracking.

mod models;
mod repository;
mod schema;

pub use repository::PostgresWatermarkRepository;
