use thiserror::Error;

/// Errors raised by the database adapter.
#[derive(Debug, Error)]
pub enum DbError {
    /// The connection URL has a scheme no backend understands.
    #[error("unsupported database url scheme: {0}")]
    UnsupportedUrl(String),

    /// A PostgreSQL operation failed.
    #[error("postgres error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to build or check out from the SQLite connection pool.
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// The statement is not a single read-only query.
    #[error("rejected statement: {0}")]
    ReadOnly(String),

    /// One or more requested tables do not exist.
    #[error("table_names {{{0}}} not found in database")]
    UnknownTables(String),

    /// The row payload returned by the database could not be decoded.
    #[error("invalid row payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A blocking database task panicked or was cancelled.
    #[error("database task failed: {0}")]
    Join(String),
}
