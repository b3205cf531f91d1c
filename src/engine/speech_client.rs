//! Text-to-speech client (ElevenLabs-style API).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("nothing to speak")]
    EmptyText,
    #[error("speech request failed: {0}")]
    RequestFailed(String),
}

/// Audio returned by the voice service, passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub base_url: String,
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct ElevenLabsClient {
    client: Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn new(settings: &SpeechSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            voice_id: settings.voice_id.clone(),
            model_id: settings.model_id.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechService for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| SpeechError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::RequestFailed(format!("{}: {}", status, error_text)));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::RequestFailed(e.to_string()))?;

        Ok(SpeechAudio {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ElevenLabsClient {
        ElevenLabsClient::new(&SpeechSettings {
            base_url: "https://api.elevenlabs.io/".into(),
            api_key: "key".into(),
            voice_id: "voice123".into(),
            model_id: "eleven_multilingual_v2".into(),
            timeout: Duration::from_secs(5),
        })
    }

    #[test]
    fn endpoint_includes_voice() {
        assert_eq!(
            client().endpoint(),
            "https://api.elevenlabs.io/v1/text-to-speech/voice123"
        );
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_request() {
        let result = client().synthesize("   ").await;
        assert!(matches!(result, Err(SpeechError::EmptyText)));
    }
}
