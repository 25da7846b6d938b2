use thiserror::Error;

/// Everything that can go wrong talking to the chat backend or loading
/// settings. Request failures all end up as the same fallback reply in the
/// transcript; the variants exist for the logs.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<String> },

    #[error("malformed response body: {0}")]
    MalformedBody(String),

    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}
