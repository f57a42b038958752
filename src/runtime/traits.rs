//! Trait abstractions for runtime I/O
//!
//! The engine only reports side-effect tags; these traits carry them out and
//! let tests swap in mocks.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialError {
    #[error("dial request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("dial webhook rejected the call with status {status}")]
    Rejected { status: u16 },
}

/// Places a call to a phone number on behalf of a conversation
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, conversation_id: &str, number: &str) -> Result<(), DialError>;
}

#[async_trait]
impl<T: Dialer + ?Sized> Dialer for Arc<T> {
    async fn dial(&self, conversation_id: &str, number: &str) -> Result<(), DialError> {
        (**self).dial(conversation_id, number).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Dialing happens on the client device; the server only records the request
#[derive(Debug, Clone, Default)]
pub struct LoggingDialer;

#[async_trait]
impl Dialer for LoggingDialer {
    async fn dial(&self, conversation_id: &str, number: &str) -> Result<(), DialError> {
        tracing::info!(conv_id = %conversation_id, number = %number, "Dial handed to client");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct DialRequest<'a> {
    conversation_id: &'a str,
    number: &'a str,
}

/// Forwards dial requests to a telephony webhook
#[derive(Debug, Clone)]
pub struct WebhookDialer {
    client: reqwest::Client,
    url: String,
}

impl WebhookDialer {
    pub fn new(url: impl Into<String>) -> Result<Self, DialError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Dialer for WebhookDialer {
    async fn dial(&self, conversation_id: &str, number: &str) -> Result<(), DialError> {
        let response = self
            .client
            .post(&self.url)
            .json(&DialRequest {
                conversation_id,
                number,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DialError::Rejected {
                status: status.as_u16(),
            });
        }

        tracing::info!(conv_id = %conversation_id, number = %number, "Dial webhook accepted call");
        Ok(())
    }
}
