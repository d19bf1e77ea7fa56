//! Speech services for the NBFC assistant.
//!
//! Wraps the ElevenLabs speech-to-text and text-to-speech APIs behind the
//! [`SpeechService`] trait, and keeps an on-disk archive of the audio that
//! passes through the voice endpoints.

pub mod archive;
pub mod config;
pub mod error;
pub mod service;
pub mod stt;
pub mod tts;

pub use archive::AudioArchive;
pub use config::SpeechConfig;
pub use error::VoiceError;
pub use service::{SpeechService, VoiceService};
pub use stt::SttService;
pub use tts::TtsService;
