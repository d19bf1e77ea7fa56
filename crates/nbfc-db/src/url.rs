//! Connection string handling.

use crate::error::DbError;

/// Builds a PostgreSQL connection URL from its parts.
///
/// User and password are percent-encoded so characters such as `@`, `:` or
/// `/` in a password do not break the URL.
pub fn postgres_url(user: &str, password: &str, host: &str, port: u16, name: &str) -> String {
    format!(
        "postgresql://{}:{}@{}:{}/{}",
        urlencoding::encode(user),
        urlencoding::encode(password),
        host,
        port,
        name
    )
}

/// A parsed database location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// A PostgreSQL URL in the form `sqlx` expects.
    Postgres(String),
    /// A SQLite file path, or `:memory:`.
    Sqlite(String),
}

impl DatabaseUrl {
    /// Parses a connection URL.
    ///
    /// Accepts `postgres://`, `postgresql://` and driver-qualified forms such
    /// as `postgresql+psycopg2://`; `sqlite://<path>`, `sqlite:<path>` and
    /// `sqlite::memory:`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::UnsupportedUrl` for any other scheme.
    pub fn parse(url: &str) -> Result<Self, DbError> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once(':')
            .ok_or_else(|| DbError::UnsupportedUrl(url.to_string()))?;
        // "postgresql+psycopg2" -> "postgresql"
        let base_scheme = scheme.split('+').next().unwrap_or(scheme).to_ascii_lowercase();

        match base_scheme.as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres(format!("postgresql:{}", rest))),
            "sqlite" => {
                let path = rest.strip_prefix("//").unwrap_or(rest);
                if path.is_empty() || path == ":memory:" {
                    Ok(Self::Sqlite(":memory:".to_string()))
                } else {
                    Ok(Self::Sqlite(path.to_string()))
                }
            }
            _ => Err(DbError::UnsupportedUrl(scheme.to_string())),
        }
    }
}
