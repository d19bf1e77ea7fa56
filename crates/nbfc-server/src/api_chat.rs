use crate::{api::ApiError, AppState};
use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearResponse {
    pub status: String,
    pub message: String,
}

/// Handler for `POST /chat/`.
pub async fn chat_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (response, session_id) = state
        .assistant
        .process_message(&payload.message, payload.session_id)
        .await
        .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

    Ok(Json(ChatResponse {
        response,
        session_id,
    }))
}

/// Handler for `DELETE /chat/{session_id}`.
pub async fn delete_session_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<ClearResponse>, ApiError> {
    if !state.assistant.clear_session(&session_id) {
        return Err(ApiError::NotFound("Session not found".to_string()));
    }

    Ok(Json(ClearResponse {
        status: "ok".to_string(),
        message: format!("Session {} cleared", session_id),
    }))
}
