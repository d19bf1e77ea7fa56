use nbfc_db::DbError;
use thiserror::Error;

/// Errors from the model client and the agent loop.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM response could not be decoded: {0}")]
    Decode(String),

    #[error("LLM returned no choices")]
    EmptyResponse,

    #[error("agent stopped after {0} model calls without a final answer")]
    IterationLimit(usize),

    #[error("invalid LLM configuration: {0}")]
    Config(String),
}

/// Errors raised inside a tool. These never abort the agent loop: they are
/// reported back to the model as the tool's output.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Database(#[from] DbError),

    #[error("model call failed: {0}")]
    Model(String),
}
