//! Conversational fallback for unmatched commands

mod client;

use async_trait::async_trait;
use tracing::{info, warn};

pub use client::ChatClient;

/// Spoken when the backend cannot produce a reply
pub const DEGRADED_REPLY: &str = "Sorry, I could not reach the AI service.";

/// System prompt sent with every query
pub const SYSTEM_PROMPT: &str =
    "You are Jarvis, a helpful voice assistant. Keep responses concise for voice interaction.";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("AI service returned an empty reply")]
    EmptyReply,

    #[error("no credential configured for the AI service")]
    MissingCredential,
}

/// A stateless chat completion backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, query: &str) -> Result<String, AiError>;
}

/// Always yields speakable text
pub struct AiResponder {
    backend: Box<dyn ChatBackend>,
}

impl AiResponder {
    pub fn new(backend: Box<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend, degrading to [`DEGRADED_REPLY`] on any error
    pub async fn respond(&self, query: &str) -> String {
        match self.backend.complete(query).await {
            Ok(reply) => {
                info!(%reply, "AI reply");
                reply
            }
            Err(e) => {
                warn!(error = %e, "AI request failed");
                DEGRADED_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, FakeChat};

    #[tokio::test]
    async fn test_passes_reply_through() {
        let log = CallLog::default();
        let responder = AiResponder::new(Box::new(FakeChat::replying(&log, "It is sunny.")));
        assert_eq!(responder.respond("what is the weather").await, "It is sunny.");
        assert_eq!(log.entries(), vec!["ai:what is the weather"]);
    }

    #[tokio::test]
    async fn test_degrades_on_error() {
        let log = CallLog::default();
        let responder = AiResponder::new(Box::new(FakeChat::failing(&log)));
        assert_eq!(responder.respond("what is the weather").await, DEGRADED_REPLY);
    }
}
