//! HTTP front end of the NBFC assistant: chat and voice endpoints over the
//! agent, plus the wiring shared with the command-line client.

pub mod api;
pub mod api_chat;
pub mod api_voice;
pub mod config;
pub mod pipeline;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use config::{Config, LoggingConfig};
use nbfc_agent::{Agent, AgentError, Assistant, OpenAiChatModel, PingSalesTeam, SqlToolkit};
use nbfc_agent::{ChatModel, ToolRegistry, NBFC_SYSTEM_PROMPT};
use nbfc_db::{DbError, SqlDatabase};
use nbfc_voice::{AudioArchive, SpeechService, VoiceError, VoiceService};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Maximum JSON request body size (2 MiB).
const MAX_REQUEST_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Hard ceiling for voice uploads (50 MiB). The configured audio limit is
/// enforced by the pipeline below this.
const MAX_VOICE_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Agent plus per-session transcripts.
    pub assistant: Arc<Assistant>,
    /// Speech-to-text and text-to-speech provider.
    pub speech: Arc<dyn SpeechService>,
    /// Where uploaded and synthesized clips are kept.
    pub archive: AudioArchive,
    /// Clip served by `/voice/test`, relative to the archive root.
    pub test_audio: PathBuf,
    /// Clip used by the voice demo, relative to the archive root.
    pub demo_audio: PathBuf,
    /// Largest upload passed on to speech-to-text.
    pub max_audio_bytes: usize,
}

/// Failures while assembling [`AppState`] from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database setup failed: {0}")]
    Database(#[from] DbError),

    #[error("LLM client setup failed: {0}")]
    Llm(#[from] AgentError),

    #[error("speech client setup failed: {0}")]
    Speech(#[from] VoiceError),
}

impl AppState {
    /// Connects every dependency named in `config`.
    ///
    /// The PostgreSQL pool is lazy, so an unreachable database surfaces on
    /// the first query rather than here.
    pub async fn from_config(config: &Config) -> Result<Self, StartupError> {
        let db = Arc::new(SqlDatabase::connect(
            &config.database.connection_url(),
            config.database.runtime_settings(),
        )?);

        if config.llm.api_key.is_empty() {
            tracing::warn!("OPENAI_API_KEY is not set; model requests will be rejected");
        }
        let model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(&config.llm)?);
        tracing::info!(model = model.model_name(), dialect = %db.dialect(), "agent configured");

        let speech: Arc<dyn SpeechService> = Arc::new(VoiceService::new(&config.speech)?);
        let archive = AudioArchive::new(&config.audio.dir);
        archive.ensure_dirs().await?;

        Ok(Self::new(
            build_assistant(db, model, config),
            speech,
            archive,
            config,
        ))
    }

    /// Assembles state from already-built parts.
    pub fn new(
        assistant: Assistant,
        speech: Arc<dyn SpeechService>,
        archive: AudioArchive,
        config: &Config,
    ) -> Self {
        Self {
            assistant: Arc::new(assistant),
            speech,
            archive,
            test_audio: PathBuf::from(&config.audio.test_file),
            demo_audio: PathBuf::from(&config.audio.demo_file),
            max_audio_bytes: config.speech.max_audio_bytes,
        }
    }
}

/// Builds the assistant: SQL toolkit plus the sales ping, under the NBFC
/// system prompt.
pub fn build_assistant(
    db: Arc<SqlDatabase>,
    model: Arc<dyn ChatModel>,
    config: &Config,
) -> Assistant {
    let mut tools = ToolRegistry::new();
    SqlToolkit::new(db, model.clone(), config.agent.max_result_rows).register_into(&mut tools);
    tools.register(Arc::new(PingSalesTeam));

    let agent = Agent::new(
        model,
        tools,
        NBFC_SYSTEM_PROMPT,
        config.agent.max_iterations,
    );
    Assistant::new(agent, config.agent.max_history_messages)
}

/// Installs the global tracing subscriber.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let voice_routes = Router::new()
        .route("/voice", post(api_voice::voice_stream_handler))
        .route("/voice/", post(api_voice::voice_stream_handler))
        .route("/voice/main", post(api_voice::voice_json_handler))
        .route("/voice/test", post(api_voice::voice_test_handler))
        .layer(DefaultBodyLimit::max(MAX_VOICE_BODY_BYTES));

    let chat_routes = Router::new()
        .route("/chat", post(api_chat::chat_handler))
        .route("/chat/", post(api_chat::chat_handler))
        .route("/chat/{session_id}", delete(api_chat::delete_session_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES));

    Router::new()
        .route("/health", get(health))
        .merge(chat_routes)
        .merge(voice_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
