use crate::error::AgentError;
use crate::llm::{ChatModel, Message};
use crate::session::{Role, Turn};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Tool-calling agent: asks the model, runs the tools it picks, feeds the
/// results back, and repeats until the model answers in plain text.
#[derive(Clone)]
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    system_prompt: Arc<str>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        system_prompt: impl Into<Arc<str>>,
        max_iterations: usize,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt: system_prompt.into(),
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    /// Produces the assistant's reply to a transcript ending in a user turn.
    ///
    /// The system prompt is prepended only if the transcript does not already
    /// start with a system turn. Tool traffic stays local to this call.
    ///
    /// # Errors
    ///
    /// Model failures abort the turn, as does running out of iterations.
    /// Tool failures do not: they are shown to the model as `Error: ...`.
    pub async fn respond(&self, transcript: &[Turn]) -> Result<String, AgentError> {
        let mut messages: Vec<Message> = Vec::with_capacity(transcript.len() + 4);
        if transcript.first().map(|t| t.role) != Some(Role::System) {
            messages.push(Message::system(&*self.system_prompt));
        }
        messages.extend(transcript.iter().map(Message::from));

        let specs = self.tools.specs();
        for iteration in 1..=self.max_iterations {
            let reply = self.model.complete(&messages, &specs).await?;

            if reply.tool_calls.is_empty() {
                tracing::debug!(iteration, "agent produced final answer");
                return Ok(reply.content.unwrap_or_default());
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply.into_message());
            for call in &calls {
                tracing::debug!(iteration, tool = %call.function.name, "agent calling tool");
                let outcome = self.tools.invoke(call).await;
                if outcome.return_direct {
                    return Ok(outcome.output);
                }
                messages.push(Message::tool(call.id.as_str(), outcome.output));
            }
        }

        tracing::warn!(max_iterations = self.max_iterations, "agent iteration limit reached");
        Err(AgentError::IterationLimit(self.max_iterations))
    }
}
