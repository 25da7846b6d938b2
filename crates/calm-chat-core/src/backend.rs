use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Successful answer from `POST /chat`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// Set by the backend when it considers the conversation finished
    #[serde(default)]
    pub ended: bool,
}

impl ChatReply {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ended: false,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// The remote service that produces assistant replies
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and wait for the reply
    async fn send(&self, message: &str) -> Result<ChatReply>;

    /// Ask the backend to forget its conversation history
    async fn reset(&self) -> Result<()>;

    /// Human-readable address, used in logs and the header
    fn describe(&self) -> String;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Like `new`, but with an overall request timeout. `None` keeps the
    /// transport default.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send(&self, message: &str) -> Result<ChatReply> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        serde_json::from_str::<ChatReply>(&body)
            .map_err(|e| ChatError::MalformedBody(e.to_string()))
    }

    async fn reset(&self) -> Result<()> {
        let url = format!("{}/reset", self.base_url);

        let response = self.client.post(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &body));
        }

        Ok(())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

fn status_error(status: u16, body: &str) -> ChatError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error);
    ChatError::Status { status, detail }
}

/// Validate the address and strip trailing slashes so `{base}/chat` is
/// always well formed
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');

    let url = Url::parse(trimmed).map_err(|e| ChatError::InvalidBackendUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ChatError::InvalidBackendUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }

    Ok(trimmed.to_string())
}
