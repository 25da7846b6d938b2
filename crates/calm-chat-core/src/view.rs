//! The seam between the controller and whatever draws the conversation.

use crate::state::Message;

/// The on-screen elements the controller drives: the input control, the
/// transcript container, and the typing indicator.
pub trait ChatView {
    /// Current contents of the input control
    fn input_text(&self) -> String;

    fn clear_input(&mut self);

    fn set_input_enabled(&mut self, enabled: bool);

    fn focus_input(&mut self) {}

    /// Show a message that was just appended to the transcript
    fn show_message(&mut self, message: &Message);

    fn set_typing_indicator(&mut self, visible: bool);
}
