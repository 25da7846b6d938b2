pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod keys;
pub mod state;
pub mod view;

// Re-export main types for convenience
pub use backend::{ChatBackend, ChatReply, HttpBackend};
pub use config::Config;
pub use controller::{ChatController, FALLBACK_REPLY};
pub use error::{ChatError, Result};
pub use keys::{Key, KeyDisposition, KeyPress, Modifiers};
pub use state::{InputState, Message, Origin, Transcript};
pub use view::ChatView;
