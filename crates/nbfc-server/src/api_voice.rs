use crate::pipeline::{run_voice_turn, PipelineError};
use crate::{api::ApiError, AppState};
use axum::{
    body::Body,
    extract::{Multipart, Query},
    http::{header, StatusCode},
    response::Response,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the multipart field carrying the recording.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Default, Deserialize)]
pub struct VoiceQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceJsonResponse {
    pub text: String,
    pub reply: String,
    pub audio_base64: String,
    pub session_id: String,
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::InternalServerError(err.to_string())
    }
}

/// Reads the `file` field of the upload, skipping any other fields.
///
/// A body that cannot be read (malformed, or over the route's size limit)
/// fails the STT stage like any other unusable recording. Only a missing
/// field is a client error.
async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::Stt(format!("failed to read upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| PipelineError::Stt(format!("failed to read upload: {}", e)))?;
        return Ok(data.to_vec());
    }
    Err(ApiError::BadRequest(format!(
        "missing multipart field `{}`",
        UPLOAD_FIELD
    )))
}

/// Handler for `POST /voice/`.
///
/// Responds with the synthesized MP3. The transcription, reply and session
/// id travel in `X-STT-Text`, `X-Agent-Reply` and `X-Session-ID`,
/// percent-encoded since header values must be ASCII.
pub async fn voice_stream_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<VoiceQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let audio = read_upload(&mut multipart).await?;
    let turn = run_voice_turn(&state, &audio, query.session_id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header("X-Session-ID", urlencoding::encode(&turn.session_id).as_ref())
        .header("X-STT-Text", urlencoding::encode(&turn.text).as_ref())
        .header("X-Agent-Reply", urlencoding::encode(&turn.reply).as_ref())
        .body(Body::from(turn.audio))
        .map_err(|e| ApiError::InternalServerError(format!("Voice endpoint failed: {}", e)))
}

/// Handler for `POST /voice/main`: same pipeline, JSON body with the audio
/// base64-encoded.
pub async fn voice_json_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<VoiceQuery>,
    mut multipart: Multipart,
) -> Result<Json<VoiceJsonResponse>, ApiError> {
    let audio = read_upload(&mut multipart).await?;
    let turn = run_voice_turn(&state, &audio, query.session_id).await?;

    Ok(Json(VoiceJsonResponse {
        text: turn.text,
        reply: turn.reply,
        audio_base64: STANDARD.encode(&turn.audio),
        session_id: turn.session_id,
    }))
}

/// Handler for `POST /voice/test`: returns a stored clip with fixed text so
/// clients can be exercised without calling any provider.
pub async fn voice_test_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<VoiceJsonResponse>, ApiError> {
    let audio = match state.archive.read(&state.test_audio).await {
        Ok(audio) => audio,
        Err(nbfc_voice::VoiceError::Archive(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("Test audio file not found".to_string()));
        }
        Err(e) => return Err(ApiError::InternalServerError(format!("/test failed: {}", e))),
    };

    Ok(Json(VoiceJsonResponse {
        text: "Test STT Text".to_string(),
        reply: "Test AI Response".to_string(),
        audio_base64: STANDARD.encode(&audio),
        session_id: "test-session-123".to_string(),
    }))
}
