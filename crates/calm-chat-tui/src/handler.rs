use anyhow::Result;
use calm_chat_core::{Key, KeyDisposition, KeyPress, Modifiers};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply(outcome) => app.receive_reply(outcome),
        AppEvent::ResetDone(outcome) => app.receive_reset(outcome),
    }
    Ok(())
}

/// Translate a crossterm key into the controller's neutral form
pub fn to_key_press(key: &KeyEvent) -> KeyPress {
    let code = match key.code {
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyPress::new(
        code,
        Modifiers {
            control: key.modifiers.contains(KeyModifiers::CONTROL),
            meta: key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
            alt: key.modifiers.contains(KeyModifiers::ALT),
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
        },
    )
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global keys
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('r') if ctrl => {
            app.request_reset();
            return;
        }
        KeyCode::PageUp => {
            let page = app.chat_height.max(2) / 2;
            app.scroll_up(page);
            return;
        }
        KeyCode::PageDown => {
            let page = app.chat_height.max(2) / 2;
            app.scroll_down(page);
            return;
        }
        _ => {}
    }

    match app.chat.handle_submit_shortcut(to_key_press(&key)) {
        KeyDisposition::Consumed(text) => {
            app.dispatch(text);
            return;
        }
        KeyDisposition::PassThrough => {}
    }

    // Disabled input ignores edits until the reply arrives
    if !app.input().enabled {
        return;
    }

    let input = app.input_mut();
    match key.code {
        KeyCode::Enter => input.insert('\n'),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Char(c) if !ctrl => input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let on_send = app
        .send_button_area
        .map(|r| point_in_rect(x, y, r))
        .unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if in_chat => app.scroll_down(3),
        MouseEventKind::ScrollUp if in_chat => app.scroll_up(3),
        MouseEventKind::Down(MouseButton::Left) if on_send => app.submit_input(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calm_chat_core::{ChatBackend, ChatError, ChatReply, InputState};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct SilentBackend;

    #[async_trait]
    impl ChatBackend for SilentBackend {
        async fn send(&self, _message: &str) -> calm_chat_core::Result<ChatReply> {
            Err(ChatError::MalformedBody("unused".into()))
        }

        async fn reset(&self) -> calm_chat_core::Result<()> {
            Ok(())
        }

        fn describe(&self) -> String {
            "silent".to_string()
        }
    }

    fn new_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Arc::new(SilentBackend), tx), rx)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, modifiers))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c), KeyModifiers::NONE)).unwrap();
        }
    }

    #[test]
    fn test_to_key_press_maps_primary_modifiers() {
        let ctrl = to_key_press(&KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL));
        assert!(ctrl.is_submit_chord());
        let sup = to_key_press(&KeyEvent::new(KeyCode::Enter, KeyModifiers::SUPER));
        assert!(sup.is_submit_chord());
        let plain = to_key_press(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(!plain.is_submit_chord());
        assert_eq!(plain.key, Key::Enter);
    }

    #[tokio::test]
    async fn test_plain_enter_inserts_newline() {
        let (mut app, _rx) = new_app();
        type_text(&mut app, "a");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        type_text(&mut app, "b");

        assert_eq!(app.input().text(), "a\nb");
        assert!(app.chat.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_ctrl_enter_submits_and_locks_input() {
        let (mut app, _rx) = new_app();
        type_text(&mut app, "hello");

        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::CONTROL)).unwrap();

        assert_eq!(app.chat.state(), InputState::AwaitingResponse);
        assert_eq!(app.chat.transcript().len(), 1);
        assert!(app.input().text().is_empty());

        // typing is ignored while awaiting, and a second chord is swallowed
        type_text(&mut app, "more");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::CONTROL)).unwrap();
        assert!(app.input().text().is_empty());
        assert_eq!(app.chat.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_event_unlocks_input() {
        let (mut app, _rx) = new_app();
        type_text(&mut app, "hello");
        handle_event(&mut app, key(KeyCode::Enter, KeyModifiers::CONTROL)).unwrap();

        handle_event(&mut app, AppEvent::Reply(Ok(ChatReply::new("ok")))).unwrap();

        assert_eq!(app.chat.state(), InputState::Idle);
        assert_eq!(app.chat.transcript().last().map(|m| m.text()), Some("ok"));
        type_text(&mut app, "x");
        assert_eq!(app.input().text(), "x");
    }

    #[tokio::test]
    async fn test_click_on_send_button_submits() {
        let (mut app, _rx) = new_app();
        app.send_button_area = Some(Rect::new(70, 20, 10, 3));
        type_text(&mut app, "clicked");

        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 72,
            row: 21,
            modifiers: KeyModifiers::NONE,
        };
        handle_event(&mut app, AppEvent::Mouse(click)).unwrap();

        assert_eq!(app.chat.transcript().len(), 1);
        assert!(app.is_awaiting());
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = new_app();
        handle_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap();
        assert!(app.should_quit);

        let (mut app, _rx) = new_app();
        handle_event(&mut app, key(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        assert!(app.should_quit);
    }
}
