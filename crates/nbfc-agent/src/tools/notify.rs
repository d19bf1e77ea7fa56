use super::Tool;
use crate::error::ToolError;
use async_trait::async_trait;
use serde_json::Value;

/// `ping_sales_team`: notifies the sales team about a lead. Its output is
/// handed to the user as-is.
///
/// No message is delivered anywhere yet; the tool only records the request
/// in the log and confirms it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PingSalesTeam;

impl PingSalesTeam {
    pub fn confirmation(lead_id: &str, message: &str) -> String {
        format!("📨 Sales team notified for Lead {}: {}", lead_id, message)
    }
}

#[async_trait]
impl Tool for PingSalesTeam {
    fn name(&self) -> &str {
        "ping_sales_team"
    }

    fn description(&self) -> &str {
        "Send a message to the sales team about a specific lead."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "lead_id": { "type": "string", "description": "Identifier of the lead" },
                "message": { "type": "string", "description": "Message for the sales team" }
            },
            "required": ["lead_id", "message"]
        })
    }

    fn return_direct(&self) -> bool {
        true
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let field = |key: &str| -> Result<String, ToolError> {
            match args.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                // Models sometimes send numeric lead ids.
                Some(Value::Number(n)) => Ok(n.to_string()),
                _ => Err(ToolError::InvalidArguments(format!(
                    "missing string field `{}`",
                    key
                ))),
            }
        };
        let lead_id = field("lead_id")?;
        let message = field("message")?;

        tracing::info!(lead_id = %lead_id, "sales team ping requested");
        Ok(Self::confirmation(&lead_id, &message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn formats_confirmation() {
        let out = PingSalesTeam
            .call(json!({"lead_id": "L-102", "message": "Call back today"}))
            .await
            .unwrap();
        assert_eq!(out, "📨 Sales team notified for Lead L-102: Call back today");
        assert!(PingSalesTeam.return_direct());
    }

    #[tokio::test]
    async fn accepts_numeric_lead_id() {
        let out = PingSalesTeam
            .call(json!({"lead_id": 42, "message": "urgent"}))
            .await
            .unwrap();
        assert_eq!(out, "📨 Sales team notified for Lead 42: urgent");
    }

    #[tokio::test]
    async fn rejects_missing_message() {
        let err = PingSalesTeam
            .call(json!({"lead_id": "L-1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
