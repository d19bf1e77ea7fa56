use super::{single_string_schema, string_arg, Tool, ToolRegistry};
use crate::error::ToolError;
use crate::llm::{ChatModel, Message};
use async_trait::async_trait;
use nbfc_db::{Dialect, SqlDatabase};
use serde_json::Value;
use std::sync::Arc;

/// The four database tools, sharing one connection pool.
#[derive(Clone)]
pub struct SqlToolkit {
    db: Arc<SqlDatabase>,
    model: Arc<dyn ChatModel>,
    max_result_rows: usize,
}

impl SqlToolkit {
    pub fn new(db: Arc<SqlDatabase>, model: Arc<dyn ChatModel>, max_result_rows: usize) -> Self {
        Self {
            db,
            model,
            max_result_rows: max_result_rows.max(1),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.db.dialect()
    }

    /// Tools in the order they are offered to the model.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(QuerySqlDatabase {
                db: self.db.clone(),
                max_rows: self.max_result_rows,
            }),
            Arc::new(InfoSqlDatabase {
                db: self.db.clone(),
            }),
            Arc::new(ListSqlDatabase {
                db: self.db.clone(),
            }),
            Arc::new(QuerySqlCheck {
                model: self.model.clone(),
                dialect: self.db.dialect(),
            }),
        ]
    }

    pub fn register_into(&self, registry: &mut ToolRegistry) {
        for tool in self.tools() {
            registry.register(tool);
        }
    }
}

/// `sql_db_query`: runs a read-only query and returns the rows.
pub struct QuerySqlDatabase {
    db: Arc<SqlDatabase>,
    max_rows: usize,
}

#[async_trait]
impl Tool for QuerySqlDatabase {
    fn name(&self) -> &str {
        "sql_db_query"
    }

    fn description(&self) -> &str {
        "Input to this tool is a detailed and correct SQL query, output is a result from the \
         database. If the query is not correct, an error message will be returned. If an error \
         is returned, rewrite the query, check the query, and try again. If you encounter an \
         issue with Unknown column 'xxxx' in 'field list', use sql_db_schema to query the \
         correct table fields."
    }

    fn parameters(&self) -> Value {
        single_string_schema("query", "A detailed and correct SQL query.")
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let query = string_arg(&args, "query")?;
        let result = self.db.run(query, self.max_rows).await?;
        tracing::debug!(
            rows = result.rows.len(),
            truncated = result.truncated,
            "sql_db_query executed"
        );
        Ok(result.to_string())
    }
}

/// `sql_db_schema`: DDL plus sample rows for the named tables.
pub struct InfoSqlDatabase {
    db: Arc<SqlDatabase>,
}

#[async_trait]
impl Tool for InfoSqlDatabase {
    fn name(&self) -> &str {
        "sql_db_schema"
    }

    fn description(&self) -> &str {
        "Input to this tool is a comma-separated list of tables, output is the schema and sample \
         rows for those tables. Be sure that the tables actually exist by calling \
         sql_db_list_tables first! Example Input: table1, table2, table3"
    }

    fn parameters(&self) -> Value {
        single_string_schema(
            "table_names",
            "A comma-separated list of the table names for which to return the schema.",
        )
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let tables = string_arg(&args, "table_names")?;
        Ok(self.db.table_info(tables).await?)
    }
}

/// `sql_db_list_tables`
pub struct ListSqlDatabase {
    db: Arc<SqlDatabase>,
}

#[async_trait]
impl Tool for ListSqlDatabase {
    fn name(&self) -> &str {
        "sql_db_list_tables"
    }

    fn description(&self) -> &str {
        "Input is an empty string, output is a comma-separated list of tables in the database."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "tool_input": { "type": "string", "description": "An empty string" }
            }
        })
    }

    async fn call(&self, _args: Value) -> Result<String, ToolError> {
        Ok(self.db.table_names().await?.join(", "))
    }
}

/// `sql_db_query_checker`: has the model proof-read a query before running it.
pub struct QuerySqlCheck {
    model: Arc<dyn ChatModel>,
    dialect: Dialect,
}

fn query_checker_prompt(query: &str, dialect: Dialect) -> String {
    format!(
        "{query}\n\
         Double check the {dialect} query above for common mistakes, including:\n\
         - Using NOT IN with NULL values\n\
         - Using UNION when UNION ALL should have been used\n\
         - Using BETWEEN for exclusive ranges\n\
         - Data type mismatch in predicates\n\
         - Properly quoting identifiers\n\
         - Using the correct number of arguments for functions\n\
         - Casting to the correct data type\n\
         - Using the proper columns for joins\n\
         \n\
         If there are any of the above mistakes, rewrite the query. If there are no mistakes, \
         just reproduce the original query.\n\
         \n\
         Output the final SQL query only.\n\
         \n\
         SQL Query: "
    )
}

#[async_trait]
impl Tool for QuerySqlCheck {
    fn name(&self) -> &str {
        "sql_db_query_checker"
    }

    fn description(&self) -> &str {
        "Use this tool to double check if your query is correct before executing it. Always use \
         this tool before executing a query with sql_db_query!"
    }

    fn parameters(&self) -> Value {
        single_string_schema("query", "A detailed and SQL query to be checked.")
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let query = string_arg(&args, "query")?;
        let prompt = query_checker_prompt(query, self.dialect);
        let reply = self
            .model
            .complete(&[Message::user(prompt)], &[])
            .await
            .map_err(|e| ToolError::Model(e.to_string()))?;
        Ok(reply.content.unwrap_or_default().trim().to_string())
    }
}
