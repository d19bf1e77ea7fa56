use crate::agent::Agent;
use crate::error::AgentError;
use crate::session::{SessionStore, Turn};

/// Conversation front door: pairs the agent with the session store.
pub struct Assistant {
    agent: Agent,
    sessions: SessionStore,
}

impl Assistant {
    pub fn new(agent: Agent, max_history_messages: usize) -> Self {
        let sessions = SessionStore::new(agent.system_prompt(), max_history_messages);
        Self { agent, sessions }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one user turn and returns `(reply, session_id)`.
    ///
    /// The session is locked for the whole exchange. If the agent fails, the
    /// user turn is taken back out so the transcript stays in pairs.
    pub async fn process_message(
        &self,
        message: &str,
        session_id: Option<String>,
    ) -> Result<(String, String), AgentError> {
        let (session_id, handle) = self.sessions.open(session_id);
        let mut transcript = handle.lock().await;

        transcript.push(Turn::user(message));
        match self.agent.respond(transcript.turns()).await {
            Ok(reply) => {
                transcript.push(Turn::assistant(reply.clone()));
                transcript.enforce_limit(self.sessions.max_history_messages());
                tracing::info!(
                    session_id = %session_id,
                    turns = transcript.len(),
                    "assistant replied"
                );
                Ok((reply, session_id))
            }
            Err(e) => {
                transcript.pop();
                tracing::warn!(session_id = %session_id, error = %e, "assistant turn failed");
                Err(e)
            }
        }
    }

    /// Forgets a session. Returns whether it existed.
    pub fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id);
        if removed {
            tracing::info!(session_id = %session_id, "session cleared");
        }
        removed
    }
}
