use serde::{Deserialize, Serialize};
use std::fmt;

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_stt_model() -> String {
    "scribe_v1".to_string()
}

fn default_language_code() -> String {
    "eng".to_string()
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_voice_id() -> String {
    "JBFqnCBsd6RMkjVDRZzb".to_string()
}

fn default_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_audio_bytes() -> usize {
    10 * 1024 * 1024
}

/// ElevenLabs speech-to-text and text-to-speech settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    /// ISO-639 language hint passed to transcription.
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_output_format")]
    pub output_format: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Largest upload accepted for transcription. Default: 10 MiB.
    #[serde(default = "default_max_audio_bytes")]
    pub max_audio_bytes: usize,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            stt_model: default_stt_model(),
            language_code: default_language_code(),
            tts_model: default_tts_model(),
            voice_id: default_voice_id(),
            output_format: default_output_format(),
            request_timeout_secs: default_request_timeout_secs(),
            max_audio_bytes: default_max_audio_bytes(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("stt_model", &self.stt_model)
            .field("language_code", &self.language_code)
            .field("tts_model", &self.tts_model)
            .field("voice_id", &self.voice_id)
            .field("output_format", &self.output_format)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_audio_bytes", &self.max_audio_bytes)
            .finish()
    }
}

impl SpeechConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}
