//! The NBFC assistant: an LLM tool-calling loop over the loan database.
//!
//! A hosted chat-completions model decides which tools to call; this crate
//! supplies the tools (SQL inspection/query and the sales-team ping), runs
//! the call/observe loop, and keeps per-session transcripts in memory.
//!
//! ```text
//! Assistant::process_message
//!   └─ SessionStore (per-session transcript, locked for the whole turn)
//!        └─ Agent::respond
//!             ├─ ChatModel::complete   (OpenAI-compatible API)
//!             └─ ToolRegistry::invoke  (sql_db_*, ping_sales_team)
//! ```

pub mod agent;
pub mod assistant;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod prompt;
pub mod session;
pub mod tools;

pub use agent::Agent;
pub use assistant::Assistant;
pub use config::{AgentConfig, OpenAiConfig};
pub use error::{AgentError, ToolError};
pub use llm::{ChatModel, FunctionCall, Message, ModelReply, ToolCall, ToolSpec};
pub use openai::OpenAiChatModel;
pub use prompt::NBFC_SYSTEM_PROMPT;
pub use session::{Role, SessionHandle, SessionStore, Transcript, Turn};
pub use tools::{PingSalesTeam, SqlToolkit, Tool, ToolOutcome, ToolRegistry};
