//! HTTP transport for the chat backend.
//!
//! The gateway takes the wire messages as a JSON array and answers with the
//! reply as a single JSON string.

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::debug;

use super::{BackendError, BackendResult, ChatBackend, WireMessage};
use crate::config::BackendConfig;

/// Chat backend reached over HTTP.
pub struct HttpChatBackend {
    client: Client,
    config: Arc<BackendConfig>,
}

impl HttpChatBackend {
    /// Create a new backend client with the given configuration.
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &str {
        self.url()
    }

    async fn chat(&self, messages: Vec<WireMessage>) -> BackendResult<String> {
        if self.config.url.trim().is_empty() {
            return Err(BackendError::NotConfigured(
                "set [backend] url or CRYPTO_CHAT_BACKEND_URL".to_string(),
            ));
        }

        debug!(url = %self.config.url, count = messages.len(), "sending chat request");

        let response = self
            .client
            .post(&self.config.url)
            .json(&messages)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

/// Extract the reply from a response body.
fn parse_reply(body: &str) -> BackendResult<String> {
    serde_json::from_str::<String>(body)
        .map_err(|e| BackendError::InvalidResponse(format!("expected a JSON string: {}", e)))
}
