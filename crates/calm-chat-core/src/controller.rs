//! The chat interaction controller: gates input, owns the transcript, and
//! turns each backend outcome into exactly one assistant message.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::{ChatBackend, ChatReply};
use crate::error::Result;
use crate::keys::{KeyDisposition, KeyPress};
use crate::state::{InputState, Message, Transcript};
use crate::view::ChatView;

/// Shown in place of a reply whenever a request fails for any reason
pub const FALLBACK_REPLY: &str =
    "I'm having a moment of difficulty connecting. Please check if the backend is running and try again.";

pub struct ChatController<V> {
    view: V,
    backend: Arc<dyn ChatBackend>,
    transcript: Transcript,
    state: InputState,
    conversation_ended: bool,
}

impl<V: ChatView> ChatController<V> {
    pub fn new(view: V, backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            view,
            backend,
            transcript: Transcript::new(),
            state: InputState::Idle,
            conversation_ended: false,
        }
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend(&self) -> Arc<dyn ChatBackend> {
        Arc::clone(&self.backend)
    }

    /// True once the backend flagged its latest reply as a goodbye
    pub fn conversation_ended(&self) -> bool {
        self.conversation_ended
    }

    /// Send `raw_text` and wait for the outcome. Returns the assistant
    /// message that was appended, or `None` if the submission was rejected.
    pub async fn submit(&mut self, raw_text: &str) -> Option<&Message> {
        let text = self.begin_submit(raw_text)?;
        let backend = self.backend();
        let outcome = backend.send(&text).await;
        self.finish_submit(outcome)
    }

    /// First half of a submission: lock the input, record the user message,
    /// clear the input and show the indicator. Returns the text the caller
    /// must send, or `None` when the input is blank or a request is already
    /// outstanding.
    pub fn begin_submit(&mut self, raw_text: &str) -> Option<String> {
        let text = raw_text.trim();
        if text.is_empty() {
            return None;
        }
        if !self.state.is_idle() {
            debug!("submission rejected, a request is already in flight");
            return None;
        }

        self.state = InputState::AwaitingResponse;
        self.view.set_input_enabled(false);

        let message = self.transcript.append(Message::user(text));
        self.view.show_message(message);

        self.view.clear_input();
        self.view.set_typing_indicator(true);

        Some(text.to_string())
    }

    /// Second half of a submission. Appends exactly one assistant message
    /// (the reply, or the fallback on any failure) and unlocks the input.
    /// A completion that arrives while idle is ignored.
    pub fn finish_submit(&mut self, outcome: Result<ChatReply>) -> Option<&Message> {
        if self.state.is_idle() {
            warn!("chat completion arrived with no request outstanding");
            return None;
        }

        self.view.set_typing_indicator(false);

        let text = match outcome {
            Ok(reply) => {
                if reply.ended {
                    info!("backend marked the conversation as ended");
                }
                self.conversation_ended = reply.ended;
                reply.reply
            }
            Err(e) => {
                warn!(error = %e, backend = %self.backend.describe(), "chat request failed");
                FALLBACK_REPLY.to_string()
            }
        };

        let message = self.transcript.append(Message::assistant(text));
        self.view.show_message(message);

        self.state = InputState::Idle;
        self.view.set_input_enabled(true);
        self.view.focus_input();

        Some(message)
    }

    /// Submit on primary-modifier + Enter using whatever is in the input.
    pub fn handle_submit_shortcut(&mut self, key: KeyPress) -> KeyDisposition {
        if !key.is_submit_chord() {
            return KeyDisposition::PassThrough;
        }
        let current = self.view.input_text();
        KeyDisposition::Consumed(self.begin_submit(&current))
    }
}
