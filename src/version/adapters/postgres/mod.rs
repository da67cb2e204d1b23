//! `PostgreSQL` adapters for version ingestion persistence.

mod builds;
mod counter;
mod models;
pub(crate) mod schema;
mod versions;

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

pub use builds::PostgresBuildRepository;
pub use counter::PostgresOrderNumberCounter;
pub use versions::PostgresVersionRepository;

/// `PostgreSQL` connection pool type shared by ingestion adapters.
pub type IngestionPgPool = Pool<ConnectionManager<PgConnection>>;
