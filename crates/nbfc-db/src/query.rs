//! Read-only statement checks and result formatting shared by both backends.

use serde_json::{Map, Value};
use std::fmt;

use crate::error::DbError;

/// One result row: column name to JSON value, in column order.
pub type Row = Map<String, Value>;

/// Rows returned by a query, capped at the caller's row limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    /// Set when the query produced more rows than the limit.
    pub truncated: bool,
}

impl QueryResult {
    /// Builds a result from up to `limit + 1` fetched rows.
    pub(crate) fn from_fetched(mut rows: Vec<Row>, limit: usize) -> Self {
        let truncated = rows.len() > limit;
        rows.truncate(limit);
        Self { rows, truncated }
    }
}

impl fmt::Display for QueryResult {
    /// Renders one JSON object per line, which is what the agent reads back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "[]");
        }
        for row in &self.rows {
            writeln!(f, "{}", Value::Object(row.clone()))?;
        }
        if self.truncated {
            write!(f, "(result truncated to {} rows)", self.rows.len())?;
        }
        Ok(())
    }
}

/// Validates that `query` is a single `SELECT`/`WITH` statement.
///
/// Returns the statement with surrounding whitespace and the trailing
/// semicolon removed, ready to be embedded as a subquery. Semicolons inside
/// string literals, quoted identifiers and comments do not count as
/// statement separators.
///
/// # Errors
///
/// Returns `DbError::ReadOnly` for empty input, multiple statements, or any
/// statement that does not start with `SELECT` or `WITH`.
pub fn ensure_read_only(query: &str) -> Result<&str, DbError> {
    let query = query.trim();
    let statement = match statement_end(query) {
        Some(end) => {
            if !skip_trivia(&query[end + 1..]).is_empty() {
                return Err(DbError::ReadOnly(
                    "only a single statement may be executed".to_string(),
                ));
            }
            query[..end].trim_end()
        }
        None => query,
    };

    let body = skip_trivia(statement);
    if body.is_empty() {
        return Err(DbError::ReadOnly("empty query".to_string()));
    }

    let keyword: String = body
        .trim_start_matches('(')
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" => Ok(statement),
        other => Err(DbError::ReadOnly(format!(
            "only SELECT queries are allowed, got {}",
            if other.is_empty() {
                "an unrecognized statement"
            } else {
                other
            }
        ))),
    }
}

/// Byte offset of the first `;` outside literals, quoted identifiers and
/// comments.
fn statement_end(sql: &str) -> Option<usize> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() {
                    if bytes[i] == quote {
                        // A doubled quote is an escaped quote.
                        if bytes.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i += 1;
            }
            b';' => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Skips leading whitespace, semicolons and comments.
fn skip_trivia(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_whitespace());
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return rest;
        }
    }
}

/// Quotes an identifier for interpolation into SQL.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders sample rows under a table description the way the schema tool
/// shows them: a tab-separated header followed by one line per row.
pub(crate) fn format_sample_rows(table: &str, rows: &[Row]) -> String {
    let mut out = format!("/*\n{} rows from {} table:\n", rows.len(), table);
    if let Some(first) = rows.first() {
        let header: Vec<&str> = first.keys().map(String::as_str).collect();
        out.push_str(&header.join("\t"));
        out.push('\n');
        for row in rows {
            let cells: Vec<String> = row.values().map(render_cell).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }
    out.push_str("*/");
    out
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => {
            // Long free-text columns would drown the schema description.
            if s.chars().count() > 100 {
                let cut: String = s.chars().take(100).collect();
                format!("{}...", cut)
            } else {
                s.clone()
            }
        }
        other => other.to_string(),
    }
}

/// Splits a comma-separated list of table names.
pub(crate) fn split_table_names(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().trim_matches('"').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
