use std::sync::Arc;

use calm_chat_core::{
    ChatBackend, ChatController, ChatError, ChatReply, ChatView, InputState, Message, Origin,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::input::InputBox;
use crate::tui::AppEvent;
use crate::ui::wrap_words;

/// Terminal-side state the controller drives through `ChatView`
#[derive(Debug, Default)]
pub struct ChatScreen {
    pub input: InputBox,
    pub typing: bool,
    /// Set whenever something new lands in the transcript
    pub follow_tail: bool,
}

impl ChatView for ChatScreen {
    fn input_text(&self) -> String {
        self.input.text().to_string()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input.enabled = enabled;
    }

    fn focus_input(&mut self) {
        self.input.focused = true;
    }

    fn show_message(&mut self, _message: &Message) {
        self.follow_tail = true;
    }

    fn set_typing_indicator(&mut self, visible: bool) {
        self.typing = visible;
        if visible {
            self.follow_tail = true;
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub chat: ChatController<ChatScreen>,
    pub backend_label: String,
    events: UnboundedSender<AppEvent>,

    // Transcript scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript pane
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_button_area: Option<Rect>,

    /// One-line notice shown in the footer
    pub status: Option<String>,

    /// Whether the terminal reports Ctrl+Enter apart from Enter
    pub submit_chord_available: bool,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, events: UnboundedSender<AppEvent>) -> Self {
        let backend_label = backend.describe();
        Self {
            should_quit: false,
            chat: ChatController::new(ChatScreen::default(), backend),
            backend_label,
            events,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            chat_area: None,
            send_button_area: None,
            status: None,
            submit_chord_available: false,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.chat.state() == InputState::AwaitingResponse
    }

    pub fn input(&self) -> &InputBox {
        &self.chat.view().input
    }

    pub fn input_mut(&mut self) -> &mut InputBox {
        &mut self.chat.view_mut().input
    }

    /// Send whatever is in the input box (Send button)
    pub fn submit_input(&mut self) {
        let current = self.input().text().to_string();
        let text = self.chat.begin_submit(&current);
        self.dispatch(text);
    }

    /// Fire the request for text the controller accepted. The reply comes
    /// back through the event loop as `AppEvent::Reply`.
    pub fn dispatch(&mut self, text: Option<String>) {
        let Some(text) = text else { return };

        self.status = None;
        self.animation_frame = 0;

        let backend = self.chat.backend();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.send(&text).await;
            let _ = events.send(AppEvent::Reply(outcome));
        });
    }

    pub fn receive_reply(&mut self, outcome: Result<ChatReply, ChatError>) {
        if self.chat.finish_submit(outcome).is_some() && self.chat.conversation_ended() {
            self.status = Some("The backend wrapped up this conversation".to_string());
        }
    }

    /// Ask the backend to drop its history. The local transcript stays.
    pub fn request_reset(&mut self) {
        self.status = Some("Resetting conversation on the backend...".to_string());

        let backend = self.chat.backend();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = backend.reset().await;
            let _ = events.send(AppEvent::ResetDone(outcome));
        });
    }

    pub fn receive_reset(&mut self, outcome: Result<(), ChatError>) {
        self.status = Some(match outcome {
            Ok(()) => {
                info!("backend conversation reset");
                "Backend conversation reset".to_string()
            }
            Err(e) => {
                warn!(error = %e, "backend reset failed");
                "Couldn't reset the backend conversation".to_string()
            }
        });
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.view().typing {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
        self.chat.view_mut().follow_tail = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
        self.chat.view_mut().follow_tail = false;
    }

    /// Keep the newest message (and the indicator) in view
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
        self.chat.view_mut().follow_tail = false;
    }

    fn max_scroll(&self) -> u16 {
        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };
        self.transcript_line_count().saturating_sub(visible_height)
    }

    /// Column width transcript text is wrapped at
    pub fn wrap_width(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        if self.chat_width > 0 {
            self.chat_width
        } else {
            50
        }
    }

    /// Row count of the transcript, using the same wrapping as the renderer
    pub fn transcript_line_count(&self) -> u16 {
        let width = self.wrap_width();

        let mut total_lines: usize = 0;
        for msg in self.chat.transcript().iter() {
            total_lines += 1; // "You:" or avatar line
            for line in msg.text().lines() {
                total_lines += wrap_words(line, width).len();
            }
            total_lines += 1; // blank line after message
        }
        if self.chat.view().typing {
            total_lines += 2; // avatar + "Thinking..."
        }

        u16::try_from(total_lines).unwrap_or(u16::MAX)
    }

    pub fn speaker_label(origin: Origin) -> &'static str {
        match origin {
            Origin::User => "You:",
            Origin::Assistant => "🌿",
        }
    }
}
