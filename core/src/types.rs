//! Request and response DTOs for the focus API.
//!
//! # Design
//! Request bodies are typed structs serialized with serde, so quotes and
//! control characters in user input are always escaped correctly. Wire
//! names are camelCase for the focus-session endpoints and snake_case for
//! the token response, matching what the server emits.
//!
//! The client never validates `type` or `status` strings; the enums here
//! exist for callers that want the known values and for typed responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Login credentials for `POST /api/v1/auth/token`. Never retained by the
/// client after the request is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/v1/focus-sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartFocusSession {
    pub lesson_id: i64,
    pub quiz_id: i64,
    pub duration_seconds: i64,
}

/// Body of `POST /api/v1/focus-sessions/{id}/events`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FocusEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: i64,
    pub details: String,
}

/// Body of `POST /api/v1/focus-sessions/{id}/end`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndFocusSession {
    pub status: String,
}

/// Violation types the server recognizes. Anything else is recorded as
/// `VisibilityChange`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusViolationType {
    VisibilityChange,
    FullscreenExit,
    BlockedShortcut,
    WindowBlur,
}

impl FocusViolationType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FocusViolationType::VisibilityChange => "VISIBILITY_CHANGE",
            FocusViolationType::FullscreenExit => "FULLSCREEN_EXIT",
            FocusViolationType::BlockedShortcut => "BLOCKED_SHORTCUT",
            FocusViolationType::WindowBlur => "WINDOW_BLUR",
        }
    }
}

impl fmt::Display for FocusViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle states of a focus session on the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FocusSessionStatus {
    Scheduled,
    Active,
    Completed,
    AutoSubmitted,
}

impl FocusSessionStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FocusSessionStatus::Scheduled => "SCHEDULED",
            FocusSessionStatus::Active => "ACTIVE",
            FocusSessionStatus::Completed => "COMPLETED",
            FocusSessionStatus::AutoSubmitted => "AUTO_SUBMITTED",
        }
    }
}

impl fmt::Display for FocusSessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful token response. `expires_at` is an RFC 3339 timestamp; the
/// client does not track expiry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionCreated {
    pub id: i64,
    pub status: FocusSessionStatus,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FocusEventRecorded {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionEnded {
    pub id: i64,
    pub status: FocusSessionStatus,
    pub ended_at: Option<String>,
}

/// Error payload the server sends with 4xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
