//! OpenAI-compatible chat completion client

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::AiConfig;

use super::{AiError, ChatBackend, SYSTEM_PROMPT};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Sends one-shot queries to `{base_url}/chat/completions`
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
    model: String,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(config: AiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            token: config.token,
            model: config.model,
            max_tokens: config.max_tokens,
        })
    }

    fn request<'a>(&'a self, query: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, query: &str) -> Result<String, AiError> {
        let token = self.token.as_ref().ok_or(AiError::MissingCredential)?;
        debug!(model = %self.model, "sending chat completion");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token.expose_secret())
            .json(&self.request(query))
            .send()
            .await
            .map_err(|e| AiError::ServiceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "chat API error");
            return Err(AiError::ServiceUnavailable(format!("chat API error {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::ServiceUnavailable(e.to_string()))?;
        extract_reply(parsed)
    }
}

fn extract_reply(response: ChatResponse) -> Result<String, AiError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(AiError::EmptyReply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> ChatClient {
        ChatClient::new(AiConfig {
            base_url: "https://models.github.ai/inference/".to_string(),
            token: token.map(SecretString::from),
            model: "openai/gpt-4.1-mini".to_string(),
            max_tokens: 150,
        })
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let client = client(Some("t"));
        assert_eq!(client.endpoint, "https://models.github.ai/inference/chat/completions");

        let json = serde_json::to_value(client.request("tell me a joke")).unwrap();
        assert_eq!(json["model"], "openai/gpt-4.1-mini");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "tell me a joke");
    }

    #[test]
    fn test_extract_reply() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":" Hello. "}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_reply(parsed).unwrap(), "Hello.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_reply(empty), Err(AiError::EmptyReply)));

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(extract_reply(null), Err(AiError::EmptyReply)));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let result = client(None).complete("hi").await;
        assert!(matches!(result, Err(AiError::MissingCredential)));
    }
}
