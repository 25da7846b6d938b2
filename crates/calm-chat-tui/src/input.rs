//! Multi-line message input with a cursor and auto-growing height.

/// Tallest the input box gets, in text rows, before it starts scrolling
pub const MAX_INPUT_ROWS: u16 = 6;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Rows needed to show `content` wrapped at `width` columns, clamped to
/// `1..=max_rows`. A full row leaves room for the cursor on the next one.
pub fn auto_grow(content: &str, width: u16, max_rows: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = content
        .split('\n')
        .map(|line| line.chars().count() / width + 1)
        .sum();
    let rows = u16::try_from(rows).unwrap_or(u16::MAX);
    rows.clamp(1, max_rows.max(1))
}

#[derive(Debug, Clone)]
pub struct InputBox {
    text: String,
    cursor: usize, // in chars
    pub enabled: bool,
    pub focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            enabled: true,
            focused: true,
        }
    }
}

impl InputBox {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Height in rows for the current content
    pub fn rows(&self, width: u16) -> u16 {
        auto_grow(&self.text, width, MAX_INPUT_ROWS)
    }

    /// (column, row) of the cursor once the text is wrapped at `width`
    pub fn cursor_position(&self, width: u16) -> (u16, u16) {
        let width = usize::from(width.max(1));
        let before: String = self.text.chars().take(self.cursor).collect();
        let mut row = 0usize;
        let mut col = 0usize;
        for (i, line) in before.split('\n').enumerate() {
            if i > 0 {
                row += 1;
            }
            let len = line.chars().count();
            row += len / width;
            col = len % width;
        }
        (
            u16::try_from(col).unwrap_or(u16::MAX),
            u16::try_from(row).unwrap_or(u16::MAX),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_grow_single_row_for_empty_or_short() {
        assert_eq!(auto_grow("", 20, MAX_INPUT_ROWS), 1);
        assert_eq!(auto_grow("hello", 20, MAX_INPUT_ROWS), 1);
    }

    #[test]
    fn test_auto_grow_counts_wraps_and_newlines() {
        // 25 chars at width 10 -> 3 rows
        assert_eq!(auto_grow(&"a".repeat(25), 10, MAX_INPUT_ROWS), 3);
        // two short lines plus a trailing empty line
        assert_eq!(auto_grow("one\ntwo\n", 10, MAX_INPUT_ROWS), 3);
    }

    #[test]
    fn test_auto_grow_reserves_cursor_row_on_exact_fit() {
        assert_eq!(auto_grow("abcd", 4, MAX_INPUT_ROWS), 2);
    }

    #[test]
    fn test_auto_grow_is_capped() {
        let tall = "line\n".repeat(20);
        assert_eq!(auto_grow(&tall, 40, MAX_INPUT_ROWS), MAX_INPUT_ROWS);
        assert_eq!(auto_grow(&"x".repeat(500), 0, 4), 4);
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut input = InputBox::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.move_left();
        input.move_left();
        input.backspace();
        assert_eq!(input.text(), "hélo");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "élo");
        input.move_end();
        input.insert('🌿');
        assert_eq!(input.text(), "élo🌿");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn test_cursor_position_follows_wrapping() {
        let mut input = InputBox::default();
        for c in "abcdefghij\nxy".chars() {
            input.insert(c);
        }
        // width 4: "abcd" "efgh" "ij" then "xy"
        assert_eq!(input.cursor_position(4), (2, 3));
        input.move_home();
        assert_eq!(input.cursor_position(4), (0, 0));
    }
}
