use serde::{Deserialize, Serialize};
use std::fmt;

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_iterations() -> usize {
    25
}

fn default_max_result_rows() -> usize {
    100
}

/// Connection settings for an OpenAI-compatible chat-completions API.
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            model: default_model(),
            temperature: 0.0,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Limits applied by the agent loop and its tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model calls per user turn.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Maximum rows `sql_db_query` hands back to the model.
    #[serde(default = "default_max_result_rows")]
    pub max_result_rows: usize,
    /// Non-system turns kept per session; 0 keeps everything.
    #[serde(default)]
    pub max_history_messages: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_result_rows: default_max_result_rows(),
            max_history_messages: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = OpenAiConfig {
            api_key: "sk-live-secret".to_string(),
            ..OpenAiConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: OpenAiConfig = serde_json::from_str(r#"{"model": "gpt-4o-mini"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.temperature, 0.0);

        let agent: AgentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(agent.max_iterations, 25);
        assert_eq!(agent.max_result_rows, 100);
        assert_eq!(agent.max_history_messages, 0);
    }
}
