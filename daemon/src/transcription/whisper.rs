//! OpenAI-compatible transcription client

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use super::TranscriptionError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response from the `/audio/transcriptions` endpoint
#[derive(serde::Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Posts WAV audio to a Whisper-style endpoint
pub struct WhisperClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
}

impl WhisperClient {
    /// Create a client for `{base_url}/audio/transcriptions`
    pub fn new(base_url: &str, api_key: SecretString, model: String) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint(base_url),
            api_key,
            model,
        })
    }

    /// Transcribe WAV bytes to raw text
    pub async fn transcribe(&self, wav: Vec<u8>) -> Result<String, TranscriptionError> {
        debug!(audio_bytes = wav.len(), "starting transcription");

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ServiceUnavailable(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "transcription request failed");
                TranscriptionError::ServiceUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "transcription API error");
            return Err(TranscriptionError::ServiceUnavailable(format!(
                "transcription API error {status}"
            )));
        }

        let result: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ServiceUnavailable(e.to_string()))?;

        Ok(result.text)
    }
}

fn endpoint(base_url: &str) -> String {
    format!("{}/audio/transcriptions", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_response_parsing() {
        let parsed: TranscriptionResponse =
            serde_json::from_str(r#"{"text":"Open Google."}"#).unwrap();
        assert_eq!(parsed.text, "Open Google.");
    }
}
