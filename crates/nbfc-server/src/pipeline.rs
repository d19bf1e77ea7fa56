//! One spoken exchange: upload, transcription, agent reply, synthesis.
//!
//! Every stage failure carries the stage name (`STT failed: ...`,
//! `Agent failed: ...`, `TTS failed: ...`) so clients can tell which
//! provider broke.

use crate::AppState;
use nbfc_voice::{AudioArchive, VoiceError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("STT failed: {0}")]
    Stt(String),

    #[error("Agent failed: {0}")]
    Agent(String),

    #[error("TTS failed: {0}")]
    Tts(String),

    /// Archive and other I/O failures outside the three stages.
    #[error("Voice endpoint failed: {0}")]
    Io(String),

    #[error("demo audio {0} not found")]
    DemoAudioMissing(String),
}

/// Result of a completed exchange.
#[derive(Debug, Clone)]
pub struct VoiceTurn {
    pub text: String,
    pub reply: String,
    pub audio: Vec<u8>,
    pub session_id: String,
}

/// Summary of a voice demo run.
#[derive(Debug, Clone, Serialize)]
pub struct DemoOutcome {
    pub text: String,
    pub reply: String,
    pub saved_file: String,
    pub session_id: String,
}

/// Strips the provider prefix so the stage prefix is not doubled.
fn stage_message(err: VoiceError) -> String {
    match err {
        VoiceError::Stt(msg) | VoiceError::Tts(msg) => msg,
        other => other.to_string(),
    }
}

/// Runs speech-to-text, the agent, and text-to-speech over `audio`.
/// Nothing is written to disk.
pub async fn converse(
    state: &AppState,
    audio: &[u8],
    session_id: Option<String>,
) -> Result<VoiceTurn, PipelineError> {
    if audio.is_empty() {
        return Err(PipelineError::Stt("audio data is empty".to_string()));
    }
    if audio.len() > state.max_audio_bytes {
        return Err(PipelineError::Stt(format!(
            "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
            audio.len(),
            state.max_audio_bytes
        )));
    }

    let text = state
        .speech
        .transcribe(audio)
        .await
        .map_err(|e| PipelineError::Stt(stage_message(e)))?;
    tracing::info!(chars = text.len(), "speech transcribed");

    let (reply, session_id) = state
        .assistant
        .process_message(&text, session_id)
        .await
        .map_err(|e| PipelineError::Agent(e.to_string()))?;

    let reply_audio = state
        .speech
        .synthesize(&reply)
        .await
        .map_err(|e| PipelineError::Tts(stage_message(e)))?;

    Ok(VoiceTurn {
        text,
        reply,
        audio: reply_audio,
        session_id,
    })
}

/// Full voice turn behind the HTTP endpoints: archives the upload, runs
/// [`converse`], and archives the synthesized reply under the same
/// timestamp as the upload.
pub async fn run_voice_turn(
    state: &AppState,
    audio: &[u8],
    session_id: Option<String>,
) -> Result<VoiceTurn, PipelineError> {
    let ts = AudioArchive::timestamp();
    let user_path = state
        .archive
        .save_user(ts, audio)
        .await
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    tracing::debug!(path = %user_path.display(), "user audio saved");

    let turn = converse(state, audio, session_id).await?;

    let ai_path = state
        .archive
        .save_ai(ts, &turn.audio)
        .await
        .map_err(|e| PipelineError::Io(e.to_string()))?;
    tracing::info!(
        session_id = %turn.session_id,
        reply_audio = %ai_path.display(),
        "voice turn complete"
    );
    Ok(turn)
}

/// Plays the demo clip through the pipeline and saves the spoken reply as
/// `output_<unix-ts>.mp3` in the archive root.
pub async fn run_voice_demo(
    state: &AppState,
    session_id: Option<String>,
) -> Result<DemoOutcome, PipelineError> {
    let demo_path: PathBuf = state.archive.root().join(&state.demo_audio);
    let audio = match tokio::fs::read(&demo_path).await {
        Ok(audio) => audio,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PipelineError::DemoAudioMissing(
                demo_path.display().to_string(),
            ))
        }
        Err(e) => return Err(PipelineError::Io(e.to_string())),
    };

    let turn = converse(state, &audio, session_id).await?;
    let saved = state
        .archive
        .save_output(&turn.audio)
        .await
        .map_err(|e| PipelineError::Io(e.to_string()))?;

    Ok(DemoOutcome {
        text: turn.text,
        reply: turn.reply,
        saved_file: saved.display().to_string(),
        session_id: turn.session_id,
    })
}
