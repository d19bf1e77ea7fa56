//! Tools the model may call, and the registry that dispatches them.

mod notify;
mod sql;

pub use notify::PingSalesTeam;
pub use sql::{
    InfoSqlDatabase, ListSqlDatabase, QuerySqlCheck, QuerySqlDatabase, SqlToolkit,
};

use crate::error::ToolError;
use crate::llm::{ToolCall, ToolSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// A named capability exposed to the model.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn parameters(&self) -> Value;

    /// When true, the tool's output ends the turn and becomes the reply.
    fn return_direct(&self) -> bool {
        false
    }

    async fn call(&self, args: Value) -> Result<String, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Result of running one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub output: String,
    pub return_direct: bool,
}

/// Ordered set of tools, looked up by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool. A later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs a model tool call. Failures are turned into an `Error: ...`
    /// observation for the model instead of being raised.
    pub async fn invoke(&self, call: &ToolCall) -> ToolOutcome {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            tracing::warn!(tool = %name, "model requested unknown tool");
            return ToolOutcome {
                output: format!(
                    "Error: {} is not a valid tool, try one of [{}].",
                    name,
                    self.names().join(", ")
                ),
                return_direct: false,
            };
        };

        let args = match parse_arguments(&call.function.arguments) {
            Ok(args) => args,
            Err(e) => {
                return ToolOutcome {
                    output: format!("Error: {}", e),
                    return_direct: false,
                }
            }
        };

        match tool.call(args).await {
            Ok(output) => {
                tracing::debug!(tool = %name, bytes = output.len(), "tool call succeeded");
                ToolOutcome {
                    output,
                    return_direct: tool.return_direct(),
                }
            }
            Err(e) => {
                tracing::info!(tool = %name, error = %e, "tool call failed");
                ToolOutcome {
                    output: format!("Error: {}", e),
                    return_direct: false,
                }
            }
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {}", e)))
}

/// Reads a string argument, accepting a bare string as the sole argument.
pub(crate) fn string_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    match args {
        Value::String(s) => Ok(s),
        Value::Object(map) => map
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments(format!("missing string field `{}`", key))),
        _ => Err(ToolError::InvalidArguments(format!(
            "expected an object with `{}`",
            key
        ))),
    }
}

/// Schema for a tool that takes a single string argument.
pub(crate) fn single_string_schema(key: &str, description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            key: { "type": "string", "description": description }
        },
        "required": [key]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes `text`."
        }
        fn parameters(&self) -> Value {
            single_string_schema("text", "what to echo")
        }
        async fn call(&self, args: Value) -> Result<String, ToolError> {
            Ok(string_arg(&args, "text")?.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::new().with(Arc::new(Echo))
    }

    #[tokio::test]
    async fn invokes_registered_tool() {
        let out = registry()
            .invoke(&ToolCall::new("1", "echo", json!({"text": "hello"})))
            .await;
        assert_eq!(out.output, "hello");
        assert!(!out.return_direct);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let out = registry()
            .invoke(&ToolCall::new("1", "drop_tables", json!({})))
            .await;
        assert_eq!(
            out.output,
            "Error: drop_tables is not a valid tool, try one of [echo]."
        );
    }

    #[tokio::test]
    async fn bad_arguments_become_error_observation() {
        let mut call = ToolCall::new("1", "echo", json!({}));
        let missing = registry().invoke(&call).await;
        assert!(missing.output.starts_with("Error: invalid arguments"));

        call.function.arguments = "{not json".to_string();
        let garbled = registry().invoke(&call).await;
        assert!(garbled.output.contains("not valid JSON"));
    }

    #[test]
    fn register_replaces_same_name() {
        let mut reg = registry();
        reg.register(Arc::new(Echo));
        assert_eq!(reg.names(), vec!["echo"]);
        assert_eq!(reg.specs()[0].parameters["required"][0], "text");
    }
}
