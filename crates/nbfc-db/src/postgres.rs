//! PostgreSQL backend.
//!
//! Result rows are aggregated to JSON server-side (`json_agg`) so arbitrary
//! column types come back without per-type decoding. Queries run inside a
//! `READ ONLY` transaction that is always rolled back.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::error::DbError;
use crate::pool::DbRuntimeSettings;
use crate::query::{format_sample_rows, quote_ident, QueryResult, Row};

#[derive(Debug, Clone)]
pub(crate) struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    /// Builds a lazily-connecting pool; nothing touches the network until
    /// the first query.
    pub(crate) fn connect_lazy(url: &str, settings: DbRuntimeSettings) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.pool_max_size)
            .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
            .connect_lazy(url)?;
        Ok(Self { pool })
    }

    pub(crate) async fn table_names(&self) -> Result<Vec<String>, DbError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT table_name::text FROM information_schema.tables
             WHERE table_schema = current_schema()
               AND table_type IN ('BASE TABLE', 'VIEW')
             ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    pub(crate) async fn table_info(
        &self,
        tables: Vec<String>,
        sample_rows: usize,
    ) -> Result<String, DbError> {
        let mut sections = Vec::with_capacity(tables.len());
        for table in &tables {
            let columns = sqlx::query_as::<_, (String, String, String, Option<String>)>(
                "SELECT column_name::text, data_type::text, is_nullable::text, column_default::text
                 FROM information_schema.columns
                 WHERE table_schema = current_schema() AND table_name = $1
                 ORDER BY ordinal_position",
            )
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

            let mut ddl = format!("CREATE TABLE {} (\n", table);
            let defs: Vec<String> = columns
                .iter()
                .map(|(name, data_type, nullable, default)| {
                    let mut def = format!("\t{} {}", name, data_type);
                    if nullable == "NO" {
                        def.push_str(" NOT NULL");
                    }
                    if let Some(default) = default {
                        def.push_str(&format!(" DEFAULT {}", default));
                    }
                    def
                })
                .collect();
            ddl.push_str(&defs.join(",\n"));
            ddl.push_str("\n)");

            let sample = self
                .fetch_json_rows(
                    &format!("SELECT * FROM {} LIMIT {}", quote_ident(table), sample_rows),
                    sample_rows,
                )
                .await?;
            sections.push(format!("{}\n\n{}", ddl, format_sample_rows(table, &sample.rows)));
        }
        Ok(sections.join("\n\n"))
    }

    pub(crate) async fn run(
        &self,
        statement: &str,
        max_rows: usize,
    ) -> Result<QueryResult, DbError> {
        self.fetch_json_rows(statement, max_rows).await
    }

    async fn fetch_json_rows(
        &self,
        statement: &str,
        max_rows: usize,
    ) -> Result<QueryResult, DbError> {
        let wrapped = wrap_for_json(statement, max_rows + 1);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        let payload: String = sqlx::query_scalar(&wrapped).fetch_one(&mut *tx).await?;
        tx.rollback().await?;

        let rows: Vec<Row> = serde_json::from_str(&payload)?;
        Ok(QueryResult::from_fetched(rows, max_rows))
    }
}

/// Embeds `statement` in a query that aggregates at most `limit` rows into
/// one JSON array. The statement sits on its own line so a trailing `--`
/// comment cannot swallow the closing parenthesis.
fn wrap_for_json(statement: &str, limit: usize) -> String {
    format!(
        "SELECT COALESCE(json_agg(t), '[]'::json)::text \
         FROM (SELECT * FROM (\n{}\n) AS q LIMIT {}) AS t",
        statement, limit
    )
}
