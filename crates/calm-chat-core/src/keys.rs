//! Framework-neutral key presses, enough to recognise the submit chord.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    /// Command on macOS, the Windows/Super key elsewhere
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Enter held with either platform's primary modifier
    pub fn is_submit_chord(&self) -> bool {
        self.key == Key::Enter && (self.modifiers.control || self.modifiers.meta)
    }
}

/// What the caller should do with a key after the controller has seen it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Not ours; let the input control handle it as usual
    PassThrough,
    /// Default behaviour suppressed. Carries the text to send when the
    /// submission was accepted.
    Consumed(Option<String>),
}
