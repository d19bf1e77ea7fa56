//! In-memory conversation sessions.
//!
//! Each session owns its transcript behind an async mutex. A caller holds
//! that lock across a full user/assistant exchange, so two requests on the
//! same session never interleave their turns.

use crate::llm::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One stored conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            Role::System => Message::system(turn.content.clone()),
            Role::User => Message::user(turn.content.clone()),
            Role::Assistant => Message::assistant(turn.content.clone()),
        }
    }
}

/// Ordered turns of one session. The first turn is always the system prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            turns: vec![Turn::system(system_prompt)],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Removes the last turn unless it is the system prompt.
    pub fn pop(&mut self) -> Option<Turn> {
        if self.turns.len() > 1 {
            self.turns.pop()
        } else {
            None
        }
    }

    /// Drops the oldest non-system turns until at most `max` remain.
    /// A user/assistant pair is removed together unless that would leave
    /// fewer than `max` turns. `max == 0` leaves the transcript untouched.
    pub fn enforce_limit(&mut self, max: usize) {
        if max == 0 {
            return;
        }
        while self.turns.len() - 1 > max {
            let history = self.turns.len() - 1;
            let drop = if history - 2 >= max
                && self.turns[1].role == Role::User
                && self.turns[2].role == Role::Assistant
            {
                2
            } else {
                1
            };
            self.turns.drain(1..1 + drop);
        }
    }
}

pub type SessionHandle = Arc<Mutex<Transcript>>;

/// Session id to transcript map shared by all requests.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    system_prompt: Arc<str>,
    max_history_messages: usize,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<Arc<str>>, max_history_messages: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            system_prompt: system_prompt.into(),
            max_history_messages,
        }
    }

    pub fn max_history_messages(&self) -> usize {
        self.max_history_messages
    }

    /// Returns the session for `id`, creating it when absent. A missing or
    /// empty id gets a fresh random UUID.
    pub fn open(&self, id: Option<String>) -> (String, SessionHandle) {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => uuid::Uuid::new_v4().to_string(),
        };

        if let Some(handle) = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return (id, handle.clone());
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let handle = sessions
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::debug!(session_id = %id, "session created");
                Arc::new(Mutex::new(Transcript::new(&self.system_prompt)))
            })
            .clone();
        (id, handle)
    }

    /// Deletes a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies a session's turns, waiting for any in-flight exchange.
    pub async fn snapshot(&self, id: &str) -> Option<Vec<Turn>> {
        let handle = self
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()?;
        let transcript = handle.lock().await;
        Some(transcript.turns().to_vec())
    }
}
