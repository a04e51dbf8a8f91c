//! Full focus-session lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then exercises every operation
//! over real HTTP through `FocusApi`. The raw-text operations are checked by
//! parsing the returned text; the typed parsers are checked through
//! `FocusApi::execute`.

use focus_core::{
    ApiError, ClientConfig, Credentials, EndFocusSession, FocusApi, FocusEvent,
    FocusSessionStatus, StartFocusSession,
};
use mock_server::{STUDENT_EMAIL, STUDENT_PASSWORD, TEACHER_EMAIL, TEACHER_PASSWORD};
use serde_json::Value;

fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn json(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

#[test]
fn focus_session_lifecycle() {
    let api = FocusApi::new(&ClientConfig::new(&spawn_server()));

    // Step 1: token.
    let text = api.request_token(STUDENT_EMAIL, STUDENT_PASSWORD).unwrap();
    let token = json(&text)["token"].as_str().unwrap().to_string();

    // Step 2: start a session.
    let text = api.start_focus_session(&token, 1, 1, 1500).unwrap();
    let created = json(&text);
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["durationSeconds"], 1500);
    let id = created["id"].as_i64().unwrap();

    // Step 3: push an event with quotes in the details.
    let text = api
        .push_focus_event(&token, id, "FULLSCREEN_EXIT", 2, r#"hit "Esc""#)
        .unwrap();
    assert_eq!(json(&text)["status"], "recorded");

    // Step 4: end the session.
    let text = api.end_focus_session(&token, id, "COMPLETED").unwrap();
    let ended = json(&text);
    assert_eq!(ended["id"], id);
    assert_eq!(ended["status"], "COMPLETED");
}

#[test]
fn error_bodies_come_back_as_text() {
    let api = FocusApi::new(&ClientConfig::new(&spawn_server()));

    let text = api.request_token(STUDENT_EMAIL, "wrong").unwrap();
    assert_eq!(json(&text)["error"], "invalid credentials");

    let text = api.start_focus_session("bogus", 1, 0, 600).unwrap();
    assert_eq!(json(&text)["error"], "student authorization required");

    let text = api.end_focus_session("bogus", 1, "COMPLETED").unwrap();
    assert_eq!(json(&text)["error"], "unauthorized");
}

#[test]
fn credentials_with_quotes_reach_the_server_intact() {
    let api = FocusApi::new(&ClientConfig::new(&spawn_server()));
    // Valid JSON on the wire, so the server answers 401 rather than 400.
    let text = api.request_token("quote\"d@example.com", "pa\"ss").unwrap();
    assert_eq!(json(&text)["error"], "invalid credentials");
}

#[test]
fn typed_parsers_over_live_server() {
    let api = FocusApi::new(&ClientConfig::new(&spawn_server()));
    let client = api.client();

    let req = client
        .build_request_token(&Credentials {
            email: TEACHER_EMAIL.to_string(),
            password: TEACHER_PASSWORD.to_string(),
        })
        .unwrap();
    let teacher = client
        .parse_request_token(api.execute(req).unwrap())
        .unwrap();
    assert_eq!(teacher.role, "teacher");
    assert_eq!(teacher.token_type, "Bearer");

    // Teachers cannot start focus sessions.
    let input = StartFocusSession {
        lesson_id: 1,
        quiz_id: 0,
        duration_seconds: 600,
    };
    let req = client
        .build_start_focus_session(&teacher.token, &input)
        .unwrap();
    let err = client
        .parse_start_focus_session(api.execute(req).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));

    let req = client
        .build_request_token(&Credentials {
            email: STUDENT_EMAIL.to_string(),
            password: STUDENT_PASSWORD.to_string(),
        })
        .unwrap();
    let student = client
        .parse_request_token(api.execute(req).unwrap())
        .unwrap();

    let req = client
        .build_start_focus_session(&student.token, &input)
        .unwrap();
    let created = client
        .parse_start_focus_session(api.execute(req).unwrap())
        .unwrap();
    assert_eq!(created.status, FocusSessionStatus::Active);

    let event = FocusEvent {
        kind: "WINDOW_BLUR".to_string(),
        severity: 4,
        details: "switched apps".to_string(),
    };
    let req = client
        .build_push_focus_event(&student.token, created.id + 100, &event)
        .unwrap();
    let err = client
        .parse_push_focus_event(api.execute(req).unwrap())
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let req = client
        .build_push_focus_event(&student.token, created.id, &event)
        .unwrap();
    let recorded = client
        .parse_push_focus_event(api.execute(req).unwrap())
        .unwrap();
    assert_eq!(recorded.status, "recorded");

    let req = client
        .build_end_focus_session(
            &student.token,
            created.id,
            &EndFocusSession {
                status: "AUTO_SUBMITTED".to_string(),
            },
        )
        .unwrap();
    let ended = client
        .parse_end_focus_session(api.execute(req).unwrap())
        .unwrap();
    assert_eq!(ended.id, created.id);
    assert_eq!(ended.status, FocusSessionStatus::AutoSubmitted);
    assert!(ended.ended_at.is_some());
}
