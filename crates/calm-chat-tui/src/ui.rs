use calm_chat_core::Origin;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

const SEND_BUTTON_WIDTH: u16 = 10;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat_screen(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" 🌿 Calm Chat ", Style::default().fg(Color::Green).bold()),
        Span::styled(
            format!("· {} ", app.backend_label),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(
            format!(" {status} "),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        // Without keyboard enhancement Ctrl+Enter reads as a plain Enter
        let send_hint = if app.submit_chord_available {
            ("Ctrl+Enter", "send")
        } else {
            ("Click Send", "send")
        };
        let hints = [
            send_hint,
            ("Enter", "newline"),
            ("PgUp/PgDn", "scroll"),
            ("Ctrl+R", "reset"),
            ("Esc", "quit"),
        ];
        let mut spans = Vec::new();
        for (key, action) in hints {
            spans.push(Span::styled(
                format!(" {key} "),
                Style::default().bg(Color::Blue).fg(Color::White),
            ));
            spans.push(Span::styled(
                format!(" {action} "),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Input width excludes the send button and the borders
    let input_inner_width = area
        .width
        .saturating_sub(SEND_BUTTON_WIDTH)
        .saturating_sub(2);
    let input_rows = app.input().rows(input_inner_width);

    let [chat_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(input_rows + 2),
    ])
    .areas(area);

    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.chat_area = Some(chat_area);
    app.send_button_area = Some(send_area);

    // Inner size minus borders, for scroll calculations
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    if app.chat.view().follow_tail {
        app.scroll_to_bottom();
    }

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area, input_inner_width);
    render_send_button(app, frame, send_area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Conversation ");

    let transcript = app.chat.transcript();
    let typing = app.chat.view().typing;
    let width = app.wrap_width();

    let text = if transcript.is_empty() && !typing {
        let greeting = "Hi, I'm here. Type whatever's on your mind and send it when you're ready.";
        Text::from(
            wrap_words(greeting, width)
                .into_iter()
                .map(|row| Line::from(Span::styled(row, Style::default().fg(Color::DarkGray))))
                .collect::<Vec<_>>(),
        )
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript.iter() {
            let label_style = match msg.origin() {
                Origin::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Origin::Assistant => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            };
            lines.push(Line::from(Span::styled(
                App::speaker_label(msg.origin()),
                label_style,
            )));
            for line in msg.text().lines() {
                lines.extend(wrap_words(line, width).into_iter().map(Line::from));
            }
            lines.push(Line::default());
        }

        if typing {
            lines.push(Line::from(Span::styled(
                App::speaker_label(Origin::Assistant),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    // Lines are pre-wrapped so scrolling agrees with `App::transcript_line_count`
    let chat = Paragraph::new(text).block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// Word-wrap one transcript line into rows of at most `width` columns.
/// Words longer than a row are split.
pub fn wrap_words(line: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split(' ') {
        let word_len = word.chars().count();
        if current_len > 0 {
            if current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }
            rows.push(std::mem::take(&mut current));
        }

        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            rows.push(chars.drain(..width).collect());
        }
        current = chars.into_iter().collect();
        current_len = current.chars().count();
    }
    rows.push(current);
    rows
}

/// Hard-wrap at `width` so rows line up with `auto_grow` and the cursor math
fn wrap_input(text: &str, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width.max(1));
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(Line::default());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(Line::from(chunk.iter().collect::<String>()));
        }
        if chars.len() % width == 0 {
            lines.push(Line::default());
        }
    }
    lines
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, inner_width: u16) {
    let input = app.input();

    let (border_color, title) = if input.enabled {
        (Color::Yellow, " Message ")
    } else {
        (Color::DarkGray, " Waiting for reply... ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Scroll so the cursor row stays visible once the box stops growing
    let visible_rows = area.height.saturating_sub(2);
    let (cursor_col, cursor_row) = input.cursor_position(inner_width);
    let scroll = cursor_row.saturating_sub(visible_rows.saturating_sub(1));

    // Use cyan text to match the "You:" style
    let paragraph = Paragraph::new(wrap_input(input.text(), inner_width))
        .style(Style::default().fg(if input.enabled { Color::Cyan } else { Color::DarkGray }))
        .block(block)
        .scroll((scroll, 0));

    frame.render_widget(paragraph, area);

    if input.enabled && input.focused {
        frame.set_cursor_position((
            area.x + cursor_col + 1,
            area.y + (cursor_row - scroll) + 1,
        ));
    }
}

fn render_send_button(app: &App, frame: &mut Frame, area: Rect) {
    let style = if app.input().enabled {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray).bg(Color::DarkGray)
    };

    let button = Paragraph::new("Send")
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(button, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use calm_chat_core::{ChatBackend, ChatReply};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    struct IdleBackend;

    #[async_trait]
    impl ChatBackend for IdleBackend {
        async fn send(&self, _message: &str) -> calm_chat_core::Result<ChatReply> {
            Ok(ChatReply::new("unused"))
        }

        async fn reset(&self) -> calm_chat_core::Result<()> {
            Ok(())
        }

        fn describe(&self) -> String {
            "idle".to_string()
        }
    }

    fn new_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Arc::new(IdleBackend), tx)
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_wrap_words_breaks_at_spaces() {
        assert_eq!(
            wrap_words("aaaaaa bbbbbb cc dd", 10),
            vec!["aaaaaa", "bbbbbb cc", "dd"]
        );
        assert_eq!(wrap_words("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_words_splits_long_words() {
        assert_eq!(
            wrap_words("abcdefghijkl xy", 5),
            vec!["abcde", "fghij", "kl xy"]
        );
    }

    #[test]
    fn test_newest_reply_tail_visible_in_narrow_pane() {
        let mut app = new_app();
        app.chat.begin_submit("hi");
        app.receive_reply(Ok(ChatReply::new(
            "aaaaaa bbbbbb cccccc dddddd eeeeee ffffff gggggg hhhhhh iiiiii jjjjjj kkkkkk LASTWORD",
        )));

        let mut terminal = Terminal::new(TestBackend::new(12, 12)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let rows = screen_rows(&terminal);
        assert!(
            rows.iter().any(|row| row.contains("LASTWORD")),
            "last word of the reply should be on screen: {rows:#?}"
        );
    }

    #[test]
    fn test_footer_points_at_send_button_without_chord_support() {
        let mut app = new_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();

        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let footer = screen_rows(&terminal).pop().unwrap();
        assert!(footer.contains("Click Send"), "footer: {footer:?}");
        assert!(!footer.contains("Ctrl+Enter"));

        app.submit_chord_available = true;
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        let footer = screen_rows(&terminal).pop().unwrap();
        assert!(footer.contains("Ctrl+Enter"), "footer: {footer:?}");
    }

    #[test]
    fn test_wrap_input_matches_auto_grow() {
        let text = "abcdefghij\n\nxy";
        let lines = wrap_input(text, 4);
        assert_eq!(
            lines.len() as u16,
            crate::input::auto_grow(text, 4, u16::MAX)
        );
    }

    #[test]
    fn test_wrap_input_adds_cursor_row_on_exact_fit() {
        let lines = wrap_input("abcd", 4);
        assert_eq!(lines.len(), 2);
    }
}
