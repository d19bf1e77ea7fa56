use crate::config::SpeechConfig;
use crate::error::VoiceError;
use crate::stt::SttService;
use crate::tts::TtsService;
use async_trait::async_trait;

/// Speech provider used by the voice pipeline.
#[async_trait]
pub trait SpeechService: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, VoiceError>;

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError>;
}

/// ElevenLabs-backed speech in both directions.
#[derive(Debug, Clone)]
pub struct VoiceService {
    stt: SttService,
    tts: TtsService,
}

impl VoiceService {
    pub fn new(config: &SpeechConfig) -> Result<Self, VoiceError> {
        if config.api_key.is_empty() {
            tracing::warn!("ELEVENLABS_API_KEY is not set; speech requests will be rejected");
        }
        Ok(Self {
            stt: SttService::new(config)?,
            tts: TtsService::new(config)?,
        })
    }

    pub fn stt(&self) -> &SttService {
        &self.stt
    }

    pub fn tts(&self) -> &TtsService {
        &self.tts
    }
}

#[async_trait]
impl SpeechService for VoiceService {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, VoiceError> {
        self.stt.transcribe(audio).await
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        self.tts.synthesize(text).await
    }
}
