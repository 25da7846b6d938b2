//! UI-agnostic conversation state
//!
//! These types are shared by every front end and don't depend on any
//! specific UI framework.

use serde::{Deserialize, Serialize};

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Assistant,
}

/// A single line of the conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    origin: Origin,
    text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only, insertion-ordered list of messages for the current session
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and hand back a reference to the stored copy
    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

/// Whether the send control accepts a new submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Idle,
    AwaitingResponse,
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InputState::Idle)
    }
}
