use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const TOKEN_TTL_HOURS: i64 = 12;
pub const DEFAULT_DURATION_SECONDS: i64 = 1200;
pub const MIN_DURATION_SECONDS: i64 = 300;

pub const STUDENT_EMAIL: &str = "student@example.com";
pub const STUDENT_PASSWORD: &str = "student-pass";
pub const OTHER_STUDENT_EMAIL: &str = "other@example.com";
pub const OTHER_STUDENT_PASSWORD: &str = "other-pass";
pub const TEACHER_EMAIL: &str = "teacher@example.com";
pub const TEACHER_PASSWORD: &str = "teacher-pass";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusViolationType {
    VisibilityChange,
    FullscreenExit,
    BlockedShortcut,
    WindowBlur,
}

impl FocusViolationType {
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "VISIBILITY_CHANGE" => Some(Self::VisibilityChange),
            "FULLSCREEN_EXIT" => Some(Self::FullscreenExit),
            "BLOCKED_SHORTCUT" => Some(Self::BlockedShortcut),
            "WINDOW_BLUR" => Some(Self::WindowBlur),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusSessionStatus {
    Scheduled,
    Active,
    Completed,
    AutoSubmitted,
}

impl FocusSessionStatus {
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "ACTIVE" => Some(Self::Active),
            "COMPLETED" => Some(Self::Completed),
            "AUTO_SUBMITTED" => Some(Self::AutoSubmitted),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Clone, Debug)]
pub struct FocusSession {
    pub id: i64,
    pub user_id: u64,
    pub lesson_id: i64,
    pub quiz_id: Option<i64>,
    pub status: FocusSessionStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
}

#[derive(Clone, Debug)]
pub struct FocusViolation {
    pub session_id: i64,
    pub kind: FocusViolationType,
    pub severity: i64,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct ApiToken {
    user_id: u64,
    expires_at: DateTime<Utc>,
}

/// In-memory backing store. Tokens are kept as SHA-256 hashes of the raw
/// value handed to the caller.
#[derive(Debug, Default)]
pub struct Store {
    pub users: Vec<User>,
    pub lessons: Vec<i64>,
    pub quizzes: Vec<i64>,
    pub sessions: HashMap<i64, FocusSession>,
    pub violations: Vec<FocusViolation>,
    tokens: HashMap<String, ApiToken>,
    next_session_id: i64,
}

impl Store {
    /// Two students, one teacher, lessons 1 and 2, quiz 1.
    pub fn seeded() -> Self {
        let user = |id, email: &str, password: &str, role| User {
            id,
            email: email.to_string(),
            password: password.to_string(),
            role,
        };
        Self {
            users: vec![
                user(1, STUDENT_EMAIL, STUDENT_PASSWORD, Role::Student),
                user(2, OTHER_STUDENT_EMAIL, OTHER_STUDENT_PASSWORD, Role::Student),
                user(3, TEACHER_EMAIL, TEACHER_PASSWORD, Role::Teacher),
            ],
            lessons: vec![1, 2],
            quizzes: vec![1],
            ..Self::default()
        }
    }

    /// Issue a 64-hex-char token valid for `TOKEN_TTL_HOURS`.
    pub fn issue_token(&mut self, user_id: u64) -> (String, DateTime<Utc>) {
        let raw = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let expires_at = Utc::now() + Duration::hours(TOKEN_TTL_HOURS);
        self.tokens.insert(
            hash_token(&raw),
            ApiToken {
                user_id,
                expires_at,
            },
        );
        (raw, expires_at)
    }

    /// Resolve a raw token to its user, ignoring expired tokens.
    pub fn user_for_token(&self, raw: &str) -> Option<&User> {
        let token = self.tokens.get(&hash_token(raw))?;
        if token.expires_at <= Utc::now() {
            return None;
        }
        self.users.iter().find(|u| u.id == token.user_id)
    }

    fn start_session(
        &mut self,
        user_id: u64,
        lesson_id: i64,
        quiz_id: Option<i64>,
        duration_seconds: i64,
    ) -> FocusSession {
        self.next_session_id += 1;
        let session = FocusSession {
            id: self.next_session_id,
            user_id,
            lesson_id,
            quiz_id,
            status: FocusSessionStatus::Active,
            started_at: Utc::now(),
            ended_at: None,
            duration_seconds,
        };
        self.sessions.insert(session.id, session.clone());
        session
    }
}

fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    router(Arc::new(RwLock::new(Store::seeded())))
}

pub fn router(db: Db) -> Router {
    Router::new()
        .route("/api/v1/auth/token", post(issue_token))
        .route("/api/v1/focus-sessions", post(create_focus_session))
        .route("/api/v1/focus-sessions/{id}/events", post(push_focus_event))
        .route("/api/v1/focus-sessions/{id}/end", post(end_focus_session))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Lenient body decoding: empty, malformed or non-object JSON all become an
/// empty object so field defaults apply.
fn decode_json(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Integer field, accepting numeric strings as well as numbers.
fn int_field(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn bearer_user(headers: &HeaderMap, store: &Store) -> Option<User> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let raw = header.strip_prefix("Bearer ")?.trim();
    if raw.is_empty() {
        return None;
    }
    store.user_for_token(raw).cloned()
}

fn format_time(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

async fn issue_token(State(db): State<Db>, body: Bytes) -> Response {
    let payload = decode_json(&body);
    let email = str_field(&payload, "email")
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    let password = str_field(&payload, "password").unwrap_or_default();

    if email.is_empty() || password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "email and password are required");
    }

    let mut store = db.write().await;
    let Some(user) = store
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "invalid credentials");
    };

    let (token, expires_at) = store.issue_token(user.id);
    info!(user_id = user.id, "issued api token");

    Json(json!({
        "token": token,
        "token_type": "Bearer",
        "expires_at": format_time(expires_at),
        "role": user.role,
    }))
    .into_response()
}

async fn create_focus_session(
    State(db): State<Db>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut store = db.write().await;
    let user = match bearer_user(&headers, &store) {
        Some(user) if user.role == Role::Student => user,
        _ => return error(StatusCode::UNAUTHORIZED, "student authorization required"),
    };

    let payload = decode_json(&body);
    let lesson_id = int_field(&payload, "lessonId").unwrap_or(0);
    if !store.lessons.contains(&lesson_id) {
        return error(StatusCode::BAD_REQUEST, "invalid lesson or student profile");
    }

    let duration_seconds = int_field(&payload, "durationSeconds")
        .unwrap_or(DEFAULT_DURATION_SECONDS)
        .max(MIN_DURATION_SECONDS);
    // Unknown quizzes are dropped rather than rejected.
    let quiz_id = int_field(&payload, "quizId").filter(|id| *id > 0 && store.quizzes.contains(id));

    let session = store.start_session(user.id, lesson_id, quiz_id, duration_seconds);
    info!(session_id = session.id, user_id = user.id, lesson_id, "focus session started");

    (
        StatusCode::CREATED,
        Json(json!({
            "id": session.id,
            "status": session.status,
            "durationSeconds": session.duration_seconds,
        })),
    )
        .into_response()
}

async fn push_focus_event(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = bearer_user(&headers, &store) else {
        return error(StatusCode::UNAUTHORIZED, "unauthorized");
    };
    if !store
        .sessions
        .get(&id)
        .is_some_and(|s| s.user_id == user.id)
    {
        return error(StatusCode::NOT_FOUND, "focus session not found");
    }

    let payload = decode_json(&body);
    let kind = str_field(&payload, "type")
        .and_then(|t| FocusViolationType::from_wire(&t))
        .unwrap_or(FocusViolationType::VisibilityChange);
    let severity = int_field(&payload, "severity").unwrap_or(1).clamp(1, 5);

    store.violations.push(FocusViolation {
        session_id: id,
        kind,
        severity,
        details: str_field(&payload, "details"),
        created_at: Utc::now(),
    });
    info!(session_id = id, ?kind, severity, "focus violation recorded");

    Json(json!({ "status": "recorded" })).into_response()
}

async fn end_focus_session(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    body: Bytes,
) -> Response {
    let mut store = db.write().await;
    let Some(user) = bearer_user(&headers, &store) else {
        return error(StatusCode::UNAUTHORIZED, "unauthorized");
    };
    let Some(session) = store
        .sessions
        .get_mut(&id)
        .filter(|s| s.user_id == user.id)
    else {
        return error(StatusCode::NOT_FOUND, "focus session not found");
    };

    let payload = decode_json(&body);
    session.status = str_field(&payload, "status")
        .and_then(|s| FocusSessionStatus::from_wire(&s))
        .unwrap_or(FocusSessionStatus::Completed);
    session.ended_at = Some(Utc::now());
    info!(session_id = id, status = ?session.status, "focus session ended");

    Json(json!({
        "id": session.id,
        "status": session.status,
        "endedAt": session.ended_at.map(format_time),
    }))
    .into_response()
}
