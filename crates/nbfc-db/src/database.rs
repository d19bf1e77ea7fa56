use std::fmt;

use crate::error::DbError;
use crate::pool::{create_pool, DbPool, DbRuntimeSettings};
use crate::postgres::PostgresBackend;
use crate::query::{ensure_read_only, split_table_names, QueryResult};
use crate::sqlite::SqliteBackend;
use crate::url::DatabaseUrl;

/// Number of sample rows included with each table description.
const SAMPLE_ROWS_IN_TABLE_INFO: usize = 3;

/// SQL dialect of the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Postgres(PostgresBackend),
    Sqlite(SqliteBackend),
}

/// A connected database the SQL tools can inspect and query.
#[derive(Debug, Clone)]
pub struct SqlDatabase {
    backend: Backend,
}

impl SqlDatabase {
    /// Connects to the database named by `url`.
    ///
    /// PostgreSQL pools connect lazily; SQLite opens the file immediately.
    ///
    /// # Errors
    ///
    /// Returns `DbError::UnsupportedUrl` for unknown schemes, or the backend
    /// error if the pool cannot be built.
    pub fn connect(url: &str, settings: DbRuntimeSettings) -> Result<Self, DbError> {
        match DatabaseUrl::parse(url)? {
            DatabaseUrl::Postgres(pg_url) => {
                tracing::info!(dialect = "postgresql", "configuring database pool");
                Ok(Self {
                    backend: Backend::Postgres(PostgresBackend::connect_lazy(&pg_url, settings)?),
                })
            }
            DatabaseUrl::Sqlite(path) => {
                tracing::info!(dialect = "sqlite", path = %path, "opening database");
                Ok(Self::from_sqlite_pool(create_pool(&path, settings)?))
            }
        }
    }

    /// Wraps an existing SQLite pool.
    pub fn from_sqlite_pool(pool: DbPool) -> Self {
        Self {
            backend: Backend::Sqlite(SqliteBackend::new(pool)),
        }
    }

    /// Returns the SQLite pool when connected to SQLite.
    pub fn sqlite_pool(&self) -> Option<&DbPool> {
        match &self.backend {
            Backend::Sqlite(backend) => Some(backend.pool()),
            Backend::Postgres(_) => None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match &self.backend {
            Backend::Postgres(_) => Dialect::Postgres,
            Backend::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Lists user tables and views, sorted by name.
    pub async fn table_names(&self) -> Result<Vec<String>, DbError> {
        match &self.backend {
            Backend::Postgres(backend) => backend.table_names().await,
            Backend::Sqlite(backend) => backend.table_names().await,
        }
    }

    /// Describes the comma-separated `tables`: a `CREATE TABLE` statement and
    /// a few sample rows each.
    ///
    /// # Errors
    ///
    /// Returns `DbError::UnknownTables` naming every table that does not
    /// exist; nothing is described in that case.
    pub async fn table_info(&self, tables: &str) -> Result<String, DbError> {
        let requested = split_table_names(tables);
        let known = self.table_names().await?;
        let missing: Vec<&str> = requested
            .iter()
            .filter(|t| !known.contains(t))
            .map(String::as_str)
            .collect();
        if requested.is_empty() {
            return Err(DbError::UnknownTables(tables.trim().to_string()));
        }
        if !missing.is_empty() {
            return Err(DbError::UnknownTables(missing.join(", ")));
        }

        match &self.backend {
            Backend::Postgres(backend) => {
                backend
                    .table_info(requested, SAMPLE_ROWS_IN_TABLE_INFO)
                    .await
            }
            Backend::Sqlite(backend) => {
                backend
                    .table_info(requested, SAMPLE_ROWS_IN_TABLE_INFO)
                    .await
            }
        }
    }

    /// Runs a single read-only query, returning at most `max_rows` rows.
    pub async fn run(&self, query: &str, max_rows: usize) -> Result<QueryResult, DbError> {
        let statement = ensure_read_only(query)?;
        tracing::debug!(dialect = %self.dialect(), max_rows, "running agent query");
        match &self.backend {
            Backend::Postgres(backend) => backend.run(statement, max_rows).await,
            Backend::Sqlite(backend) => backend.run(statement.to_string(), max_rows).await,
        }
    }
}
