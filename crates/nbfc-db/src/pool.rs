//! SQLite connection pool creation and configuration.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;

use crate::error::DbError;

/// Runtime tunables for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections (both backends).
    pub pool_max_size: u32,

    /// How long to wait for a pooled connection, in seconds.
    pub acquire_timeout_secs: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
            acquire_timeout_secs: 30,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Creates a SQLite connection pool with foreign keys enabled.
///
/// Use `:memory:` for an in-memory database. Every in-memory connection is
/// its own database, so the pool is capped at a single connection there.
///
/// # Errors
///
/// Returns `DbError::Pool` if the connection pool cannot be created.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, DbError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| {
            conn.execute_batch(&format!(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = {};",
                settings.busy_timeout_ms
            ))
        });

    let max_size = if db_path == ":memory:" {
        1
    } else {
        settings.pool_max_size
    };

    let pool = Pool::builder()
        .max_size(max_size)
        .connection_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
        .build(manager)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_file_pool_applies_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.db");
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 3,
            acquire_timeout_secs: 5,
        };

        let pool =
            create_pool(path.to_str().unwrap(), settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let fk: i32 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .expect("should query foreign_keys");
        assert_eq!(fk, 1, "foreign keys should be enabled");

        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500, "busy timeout should match settings");

        assert_eq!(pool.max_size(), 3, "pool max size should match settings");
    }

    #[test]
    fn in_memory_pool_is_single_connection() {
        let pool = create_pool(":memory:", DbRuntimeSettings::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
    }
}
