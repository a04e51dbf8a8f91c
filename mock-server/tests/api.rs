use std::sync::Arc;

use axum::{
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::{
    app, router, Db, FocusSessionStatus, FocusViolationType, Store, OTHER_STUDENT_EMAIL,
    OTHER_STUDENT_PASSWORD, STUDENT_EMAIL, STUDENT_PASSWORD, TEACHER_EMAIL, TEACHER_PASSWORD,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, token: Option<&str>, body: &str) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.to_string()).unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let body = format!(r#"{{"email":"{email}","password":"{password}"}}"#);
    let resp = send(app, json_request("/api/v1/auth/token", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    body_json(resp).await["token"].as_str().unwrap().to_string()
}

async fn start_session(app: &Router, token: &str) -> i64 {
    let resp = send(
        app,
        json_request(
            "/api/v1/focus-sessions",
            Some(token),
            r#"{"lessonId":1,"quizId":1,"durationSeconds":900}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_i64().unwrap()
}

fn shared() -> (Db, Router) {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    let app = router(db.clone());
    (db, app)
}

// --- token ---

#[tokio::test]
async fn token_success_returns_bearer_token() {
    let app = app();
    let resp = send(
        &app,
        json_request(
            "/api/v1/auth/token",
            None,
            &format!(r#"{{"email":"  STUDENT@example.com ","password":"{STUDENT_PASSWORD}"}}"#),
        ),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["role"], "student");
    assert!(body["expires_at"].as_str().unwrap().ends_with("+00:00"));
}

#[tokio::test]
async fn token_missing_fields_returns_400() {
    let app = app();
    for body in [r#"{"email":"student@example.com"}"#, "", "not json"] {
        let resp = send(&app, json_request("/api/v1/auth/token", None, body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body_json(resp).await["error"], "email and password are required");
    }
}

#[tokio::test]
async fn token_wrong_password_returns_401() {
    let app = app();
    let body = format!(r#"{{"email":"{STUDENT_EMAIL}","password":"nope"}}"#);
    let resp = send(&app, json_request("/api/v1/auth/token", None, &body)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "invalid credentials");
}

// --- start ---

#[tokio::test]
async fn start_without_token_returns_401() {
    let app = app();
    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions", None, r#"{"lessonId":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "student authorization required");
}

#[tokio::test]
async fn start_as_teacher_returns_401() {
    let app = app();
    let token = login(&app, TEACHER_EMAIL, TEACHER_PASSWORD).await;
    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions", Some(&token), r#"{"lessonId":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn start_unknown_lesson_returns_400() {
    let app = app();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions", Some(&token), r#"{"lessonId":99}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "invalid lesson or student profile");
}

#[tokio::test]
async fn start_applies_duration_floor_and_default() {
    let (db, app) = shared();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;

    let resp = send(
        &app,
        json_request(
            "/api/v1/focus-sessions",
            Some(&token),
            r#"{"lessonId":2,"quizId":77,"durationSeconds":10}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["durationSeconds"], 300);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(db.read().await.sessions[&id].quiz_id, None);

    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions", Some(&token), r#"{"lessonId":"1"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["durationSeconds"], 1200);
}

// --- events ---

#[tokio::test]
async fn event_falls_back_and_clamps() {
    let (db, app) = shared();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let id = start_session(&app, &token).await;

    let resp = send(
        &app,
        json_request(
            &format!("/api/v1/focus-sessions/{id}/events"),
            Some(&token),
            r#"{"type":"SOMETHING_ELSE","severity":42,"details":"left 'tab'"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "recorded");

    let resp = send(
        &app,
        json_request(
            &format!("/api/v1/focus-sessions/{id}/events"),
            Some(&token),
            r#"{"type":"WINDOW_BLUR","severity":-3}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let store = db.read().await;
    assert_eq!(store.violations.len(), 2);
    assert_eq!(store.violations[0].kind, FocusViolationType::VisibilityChange);
    assert_eq!(store.violations[0].severity, 5);
    assert_eq!(store.violations[0].details.as_deref(), Some("left 'tab'"));
    assert_eq!(store.violations[1].kind, FocusViolationType::WindowBlur);
    assert_eq!(store.violations[1].severity, 1);
    assert!(store.violations[1].details.is_none());
}

#[tokio::test]
async fn event_on_someone_elses_session_returns_404() {
    let app = app();
    let owner = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let other = login(&app, OTHER_STUDENT_EMAIL, OTHER_STUDENT_PASSWORD).await;
    let id = start_session(&app, &owner).await;

    let resp = send(
        &app,
        json_request(
            &format!("/api/v1/focus-sessions/{id}/events"),
            Some(&other),
            r#"{"type":"WINDOW_BLUR"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "focus session not found");
}

#[tokio::test]
async fn event_with_unknown_token_returns_401() {
    let app = app();
    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions/1/events", Some("bogus"), "{}"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "unauthorized");
}

// --- end ---

#[tokio::test]
async fn end_sets_status_and_timestamp() {
    let (db, app) = shared();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let id = start_session(&app, &token).await;

    let resp = send(
        &app,
        json_request(
            &format!("/api/v1/focus-sessions/{id}/end"),
            Some(&token),
            r#"{"status":"AUTO_SUBMITTED"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["status"], "AUTO_SUBMITTED");
    assert!(body["endedAt"].is_string());

    let store = db.read().await;
    assert_eq!(store.sessions[&id].status, FocusSessionStatus::AutoSubmitted);
    assert!(store.sessions[&id].ended_at.is_some());
}

#[tokio::test]
async fn end_unknown_status_falls_back_to_completed() {
    let app = app();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let id = start_session(&app, &token).await;

    let resp = send(
        &app,
        json_request(
            &format!("/api/v1/focus-sessions/{id}/end"),
            Some(&token),
            r#"{"status":"done"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "COMPLETED");
}

#[tokio::test]
async fn end_missing_session_returns_404() {
    let app = app();
    let token = login(&app, STUDENT_EMAIL, STUDENT_PASSWORD).await;
    let resp = send(
        &app,
        json_request("/api/v1/focus-sessions/999/end", Some(&token), "{}"),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
