use crate::config::SpeechConfig;
use crate::error::VoiceError;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Speech-to-text through the ElevenLabs transcription endpoint.
#[derive(Clone)]
pub struct SttService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_id: String,
    language_code: String,
    max_input_bytes: usize,
}

impl fmt::Debug for SttService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SttService")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("language_code", &self.language_code)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl SttService {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint("/v1/speech-to-text"),
            api_key: config.api_key.clone(),
            model_id: config.stt_model.clone(),
            language_code: config.language_code.clone(),
            max_input_bytes: config.max_audio_bytes,
        })
    }

    /// Transcribes an MP3 clip. Empty and oversized clips are rejected
    /// before any request is made.
    pub async fn transcribe(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        if audio_data.is_empty() {
            return Err(VoiceError::Stt("audio data is empty".to_string()));
        }
        if audio_data.len() > self.max_input_bytes {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio_data.len(),
                self.max_input_bytes
            )));
        }

        let file = Part::bytes(audio_data.to_vec())
            .file_name("audio.mp3")
            .mime_str("audio/mpeg")
            .map_err(|e| VoiceError::Stt(e.to_string()))?;
        let form = Form::new()
            .part("file", file)
            .text("model_id", self.model_id.clone())
            .text("language_code", self.language_code.clone())
            .text("tag_audio_events", "false")
            .text("diarize", "false");

        let resp = self
            .client
            .post(&self.endpoint)
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "transcription service returned {}: {}",
                status, body
            )));
        }

        let parsed: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("invalid transcription response: {}", e)))?;
        tracing::debug!(chars = parsed.text.len(), "transcription complete");
        Ok(parsed.text.trim().to_string())
    }
}
