mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, json_request, test_app};
use nbfc_agent::Role;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok() {
    let app = test_app();
    let response = app
        .router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn chat_creates_and_continues_a_session() {
    let app = test_app();

    let first = app
        .router
        .clone()
        .oneshot(json_request("POST", "/chat/", json!({"message": "hello"})))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;
    assert_eq!(first["response"], "echo: hello");
    let session_id = first["session_id"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());

    let second = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/chat",
            json!({"message": "again", "session_id": session_id}),
        ))
        .await
        .unwrap();
    let second = body_json(second).await;
    assert_eq!(second["session_id"], session_id.as_str());

    let turns = app
        .state
        .assistant
        .sessions()
        .snapshot(&session_id)
        .await
        .unwrap();
    let roles: Vec<Role> = turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
    assert!(turns[0].content.starts_with("You are NBFC AI Assistant"));
}

#[tokio::test]
async fn null_session_id_starts_fresh() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/chat/",
            json!({"message": "hi", "session_id": null}),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["session_id"].as_str().unwrap().len(), 36);
}

#[tokio::test]
async fn agent_failure_is_500_with_detail() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/chat/", json!({"message": "boom"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "LLM API error (503): model overloaded");
}

#[tokio::test]
async fn delete_session_then_404() {
    let app = test_app();
    let created = body_json(
        app.router
            .clone()
            .oneshot(json_request("POST", "/chat/", json!({"message": "hi"})))
            .await
            .unwrap(),
    )
    .await;
    let id = created["session_id"].as_str().unwrap().to_string();

    let delete = || {
        Request::builder()
            .method("DELETE")
            .uri(format!("/chat/{}", id))
            .body(Body::empty())
            .unwrap()
    };

    let ok = app.router.clone().oneshot(delete()).await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let ok = body_json(ok).await;
    assert_eq!(ok["status"], "ok");
    assert_eq!(ok["message"], format!("Session {} cleared", id));

    let gone = app.router.clone().oneshot(delete()).await.unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(gone).await, json!({"detail": "Session not found"}));
}

#[tokio::test]
async fn concurrent_requests_on_one_session_stay_paired() {
    let app = test_app();
    let (id, _) = app.state.assistant.sessions().open(None);

    let requests = (0..6).map(|i| {
        app.router.clone().oneshot(json_request(
            "POST",
            "/chat/",
            json!({"message": format!("question {i}"), "session_id": id}),
        ))
    });
    for response in futures_util::future::join_all(requests).await {
        assert_eq!(response.unwrap().status(), StatusCode::OK);
    }

    let turns = app.state.assistant.sessions().snapshot(&id).await.unwrap();
    assert_eq!(turns.len(), 13);
    for pair in turns[1..].chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
        assert_eq!(pair[1].content, format!("echo: {}", pair[0].content));
    }
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = test_app();
    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("origin", "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
