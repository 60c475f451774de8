use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{ChatConfig, ConfigError};

/// Why a reply could not be fetched. Callers treat every variant the same
/// way; the distinction only shows up in logs.
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("server responded with status {0}")]
    Status(StatusCode),

    #[error("could not decode reply body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("server returned an empty reply")]
    EmptyReply,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: String,
}

/// Anything that can turn a user message into a reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn fetch_reply(&self, message: &str) -> Result<String, ReplyError>;
}

pub struct ChatClient {
    chat_url: String,
    client: reqwest::Client,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            chat_url: config.chat_url(),
            client,
        })
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn fetch_reply(&self, message: &str) -> Result<String, ReplyError> {
        debug!("Sending message to {}: {:?}", self.chat_url, message);

        // `.json` sets the Content-Type header for us
        let response = self
            .client
            .post(&self.chat_url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(|e| {
                error!("Chat request to {} failed: {}", self.chat_url, e);
                ReplyError::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            // Body of a failed response is never inspected
            error!("Chat request failed with status {}", status);
            return Err(ReplyError::Status(status));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            error!("Could not decode chat reply: {}", e);
            ReplyError::Body(e)
        })?;

        debug!("Received reply: {:?}", body.reply);

        if body.reply.trim().is_empty() {
            error!("Chat service returned an empty reply");
            return Err(ReplyError::EmptyReply);
        }

        Ok(body.reply)
    }
}
