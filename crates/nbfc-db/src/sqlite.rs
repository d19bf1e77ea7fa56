//! SQLite backend. All work runs on the blocking pool.

use base64::Engine;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::Value;

use crate::error::DbError;
use crate::pool::DbPool;
use crate::query::{format_sample_rows, quote_ident, QueryResult, Row};

#[derive(Debug, Clone)]
pub(crate) struct SqliteBackend {
    pool: DbPool,
}

impl SqliteBackend {
    pub(crate) fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DbError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| DbError::Join(e.to_string()))?
    }

    pub(crate) async fn table_names(&self) -> Result<Vec<String>, DbError> {
        self.with_conn(|conn| list_tables(conn)).await
    }

    pub(crate) async fn table_info(
        &self,
        tables: Vec<String>,
        sample_rows: usize,
    ) -> Result<String, DbError> {
        self.with_conn(move |conn| {
            let mut sections = Vec::with_capacity(tables.len());
            for table in &tables {
                let ddl: String = conn.query_row(
                    "SELECT sql FROM sqlite_master WHERE name = ?1",
                    [table],
                    |row| row.get(0),
                )?;
                let sample = fetch_rows(
                    conn,
                    &format!("SELECT * FROM {} LIMIT {}", quote_ident(table), sample_rows),
                    sample_rows,
                )?;
                sections.push(format!(
                    "{}\n\n{}",
                    ddl.trim(),
                    format_sample_rows(table, &sample.rows)
                ));
            }
            Ok(sections.join("\n\n"))
        })
        .await
    }

    pub(crate) async fn run(
        &self,
        statement: String,
        max_rows: usize,
    ) -> Result<QueryResult, DbError> {
        self.with_conn(move |conn| fetch_rows(conn, &statement, max_rows))
            .await
    }
}

fn list_tables(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master
         WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite_%'
         ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

fn fetch_rows(conn: &Connection, sql: &str, max_rows: usize) -> Result<QueryResult, DbError> {
    let mut stmt = conn.prepare(sql)?;
    if !stmt.readonly() {
        return Err(DbError::ReadOnly(
            "statement would modify the database".to_string(),
        ));
    }

    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let mut rows = stmt.query([])?;
    let mut fetched = Vec::new();

    while let Some(row) = rows.next()? {
        let mut out = Row::new();
        for (idx, name) in columns.iter().enumerate() {
            out.insert(name.clone(), to_json(row.get_ref(idx)?));
        }
        fetched.push(out);
        if fetched.len() > max_rows {
            break;
        }
    }

    Ok(QueryResult::from_fetched(fetched, max_rows))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(base64::engine::general_purpose::STANDARD.encode(b)),
    }
}
