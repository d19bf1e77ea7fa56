//! Database access for the NBFC assistant's SQL tools.
//!
//! The assistant never owns the loan-origination schema: it only connects to
//! an existing database, lists its tables, describes them, and runs read-only
//! queries on behalf of the agent. Two backends are supported:
//!
//! - **PostgreSQL** (via `sqlx`) for the production loan database.
//! - **SQLite** (via `rusqlite` + `r2d2`) for local development and tests.
//!
//! The backend is picked from the connection URL scheme by
//! [`SqlDatabase::connect`].

mod database;
mod error;
mod pool;
mod postgres;
mod query;
mod sqlite;
mod url;

pub use database::{Dialect, SqlDatabase};
pub use error::DbError;
pub use pool::{create_pool, DbPool, DbRuntimeSettings};
pub use query::{ensure_read_only, QueryResult, Row};
pub use url::{postgres_url, DatabaseUrl};
