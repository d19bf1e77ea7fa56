use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use nbfc_voice::{SpeechConfig, SpeechService, VoiceError, VoiceService};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MockState {
    calls: Arc<AtomicUsize>,
    stt_fields: Arc<Mutex<HashMap<String, String>>>,
    stt_file_len: Arc<Mutex<usize>>,
    tts_request: Arc<Mutex<Option<(String, String, Value)>>>,
    api_keys: Arc<Mutex<Vec<String>>>,
}

async fn stt_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    record_key(&state, &headers);
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            *state.stt_file_len.lock().unwrap() = field.bytes().await.unwrap().len();
        } else {
            let value = field.text().await.unwrap();
            state.stt_fields.lock().unwrap().insert(name, value);
        }
    }
    (
        StatusCode::OK,
        Json(json!({"language_code": "eng", "text": "  show me rejected leads  "})),
    )
}

async fn tts_handler(
    State(state): State<MockState>,
    Path(voice_id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Vec<u8>) {
    state.calls.fetch_add(1, Ordering::SeqCst);
    record_key(&state, &headers);
    let format = query.get("output_format").cloned().unwrap_or_default();
    *state.tts_request.lock().unwrap() = Some((voice_id, format, body));
    (StatusCode::OK, b"ID3fake-mp3".to_vec())
}

fn record_key(state: &MockState, headers: &HeaderMap) {
    if let Some(key) = headers.get("xi-api-key").and_then(|v| v.to_str().ok()) {
        state.api_keys.lock().unwrap().push(key.to_string());
    }
}

async fn spawn_mock() -> (String, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/v1/speech-to-text", post(stt_handler))
        .route("/v1/text-to-speech/{voice_id}", post(tts_handler))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn transcribe_posts_multipart_form() {
    let (base, state) = spawn_mock().await;
    let service = VoiceService::new(&SpeechConfig::new(base, "xi-test")).unwrap();

    let text = service.transcribe(b"ID3\x04\x00audio").await.unwrap();
    assert_eq!(text, "show me rejected leads");

    let fields = state.stt_fields.lock().unwrap().clone();
    assert_eq!(fields["model_id"], "scribe_v1");
    assert_eq!(fields["language_code"], "eng");
    assert_eq!(fields["tag_audio_events"], "false");
    assert_eq!(fields["diarize"], "false");
    assert_eq!(*state.stt_file_len.lock().unwrap(), 10);
    assert_eq!(state.api_keys.lock().unwrap().as_slice(), ["xi-test"]);
}

#[tokio::test]
async fn synthesize_sends_voice_format_and_model() {
    let (base, state) = spawn_mock().await;
    let config = SpeechConfig {
        voice_id: "voice-123".to_string(),
        ..SpeechConfig::new(base, "xi-test")
    };
    let service = VoiceService::new(&config).unwrap();

    let audio = service.synthesize("Two leads were rejected.").await.unwrap();
    assert_eq!(audio, b"ID3fake-mp3");

    let (voice, format, body) = state.tts_request.lock().unwrap().clone().unwrap();
    assert_eq!(voice, "voice-123");
    assert_eq!(format, "mp3_44100_128");
    assert_eq!(
        body,
        json!({"text": "Two leads were rejected.", "model_id": "eleven_multilingual_v2"})
    );
}

#[tokio::test]
async fn empty_and_oversized_audio_never_reach_the_api() {
    let (base, state) = spawn_mock().await;
    let config = SpeechConfig {
        max_audio_bytes: 4,
        ..SpeechConfig::new(base, "xi-test")
    };
    let service = VoiceService::new(&config).unwrap();

    assert!(matches!(
        service.transcribe(b"").await,
        Err(VoiceError::Stt(msg)) if msg.contains("empty")
    ));
    assert!(matches!(
        service.transcribe(b"12345").await,
        Err(VoiceError::Stt(msg)) if msg.contains("exceeds maximum size")
    ));
    assert_eq!(state.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn provider_errors_are_reported_per_stage() {
    let app = Router::new()
        .route(
            "/v1/speech-to-text",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        )
        .route(
            "/v1/text-to-speech/{voice_id}",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let service =
        VoiceService::new(&SpeechConfig::new(format!("http://{}", addr), "bad")).unwrap();
    match service.transcribe(b"ID3").await {
        Err(VoiceError::Stt(msg)) => assert!(msg.contains("401"), "{msg}"),
        other => panic!("expected STT error, got {:?}", other),
    }
    match service.synthesize("hello").await {
        Err(VoiceError::Tts(msg)) => assert!(msg.contains("quota exceeded"), "{msg}"),
        other => panic!("expected TTS error, got {:?}", other),
    }
}

#[test]
fn config_from_toml_and_redacted_debug() {
    let config: SpeechConfig = toml::from_str(
        r#"
        api_key = "xi-secret"
        voice_id = "abc"
        "#,
    )
    .unwrap();
    assert_eq!(config.voice_id, "abc");
    assert_eq!(config.base_url, "https://api.elevenlabs.io");
    assert_eq!(config.max_audio_bytes, 10 * 1024 * 1024);
    assert!(!format!("{:?}", config).contains("xi-secret"));
}

#[test]
fn blank_voice_id_is_rejected() {
    let config = SpeechConfig {
        voice_id: String::new(),
        ..SpeechConfig::default()
    };
    assert!(matches!(VoiceService::new(&config), Err(VoiceError::Config(_))));
}
