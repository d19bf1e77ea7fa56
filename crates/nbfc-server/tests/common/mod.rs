#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use nbfc_agent::{AgentError, ChatModel, Message, ModelReply, ToolSpec};
use nbfc_db::{create_pool, DbRuntimeSettings, SqlDatabase};
use nbfc_server::config::Config;
use nbfc_server::{app, build_assistant, AppState};
use nbfc_voice::{AudioArchive, SpeechService, VoiceError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const BOUNDARY: &str = "nbfc-test-boundary";

/// Replies with the most recent user message. Fails on "boom".
pub struct EchoModel;

#[async_trait]
impl ChatModel for EchoModel {
    fn model_name(&self) -> &str {
        "echo"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<ModelReply, AgentError> {
        assert!(tools.iter().any(|t| t.name == "ping_sales_team"));
        tokio::time::sleep(Duration::from_millis(2)).await;
        let last = messages
            .iter()
            .rev()
            .find_map(|m| match m {
                Message::User { content } => Some(content.clone()),
                _ => None,
            })
            .unwrap_or_default();
        if last == "boom" {
            return Err(AgentError::Api {
                status: 503,
                message: "model overloaded".to_string(),
            });
        }
        Ok(ModelReply::text(format!("echo: {last}")))
    }
}

/// Transcribes any clip to a fixed sentence and "synthesizes" by prefixing
/// the text with an MP3 tag.
pub struct FakeSpeech {
    pub transcript: String,
    pub fail_tts: bool,
    /// Wall-clock pause before synthesis returns.
    pub synth_delay: Duration,
}

impl Default for FakeSpeech {
    fn default() -> Self {
        Self {
            transcript: "how many leads are pending?".to_string(),
            fail_tts: false,
            synth_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl SpeechService for FakeSpeech {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, VoiceError> {
        Ok(self.transcript.clone())
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if !self.synth_delay.is_zero() {
            tokio::time::sleep(self.synth_delay).await;
        }
        if self.fail_tts {
            return Err(VoiceError::Tts("quota exceeded".to_string()));
        }
        let mut audio = b"ID3".to_vec();
        audio.extend_from_slice(text.as_bytes());
        Ok(audio)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub audio_dir: tempfile::TempDir,
}

pub fn test_app() -> TestApp {
    test_app_with(FakeSpeech::default(), Config::default())
}

pub fn test_app_with(speech: FakeSpeech, mut config: Config) -> TestApp {
    let audio_dir = tempfile::tempdir().unwrap();
    config.audio.dir = audio_dir.path().display().to_string();

    let pool = create_pool(":memory:", DbRuntimeSettings::default()).unwrap();
    let db = Arc::new(SqlDatabase::from_sqlite_pool(pool));
    let assistant = build_assistant(db, Arc::new(EchoModel), &config);

    let state = AppState::new(
        assistant,
        Arc::new(speech),
        AudioArchive::new(audio_dir.path()),
        &config,
    );
    TestApp {
        router: app(state.clone()),
        state,
        audio_dir,
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn multipart_request(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"clip.mp3\"\r\n\
             Content-Type: audio/mpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
