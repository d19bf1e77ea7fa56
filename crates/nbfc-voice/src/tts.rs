use crate::config::SpeechConfig;
use crate::error::VoiceError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Maximum text input size for TTS (64 KiB).
const MAX_TTS_INPUT_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// Text-to-speech through the ElevenLabs synthesis endpoint.
#[derive(Clone)]
pub struct TtsService {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model_id: String,
    output_format: String,
}

impl fmt::Debug for TtsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtsService")
            .field("endpoint", &self.endpoint)
            .field("model_id", &self.model_id)
            .field("output_format", &self.output_format)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl TtsService {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.voice_id.trim().is_empty() {
            return Err(VoiceError::Config("voice_id must not be empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint(&format!("/v1/text-to-speech/{}", config.voice_id)),
            api_key: config.api_key.clone(),
            model_id: config.tts_model.clone(),
            output_format: config.output_format.clone(),
        })
    }

    /// Synthesizes `text` and returns the encoded audio (MP3 by default).
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::Tts("text is empty".to_string()));
        }
        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", &self.api_key)
            .json(&SynthesisRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "synthesis service returned {}: {}",
                status, body
            )));
        }

        let audio = resp
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("failed to read audio: {}", e)))?;
        if audio.is_empty() {
            return Err(VoiceError::Tts("synthesis returned no audio".to_string()));
        }
        tracing::debug!(bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}
