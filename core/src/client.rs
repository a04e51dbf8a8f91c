//! Stateless HTTP request builder and response parser for the focus API.
//!
//! # Design
//! `FocusClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a parse step that consumes an `HttpResponse`. The raw
//! path is `parse_text`, which hands back the body untouched regardless of
//! status. The typed `parse_*` methods are opt-in and do inspect the status.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Credentials, EndFocusSession, ErrorBody, FocusEvent, FocusEventRecorded, FocusSessionCreated,
    FocusSessionEnded, StartFocusSession, TokenResponse,
};

pub const TOKEN_PATH: &str = "/api/v1/auth/token";
pub const FOCUS_SESSIONS_PATH: &str = "/api/v1/focus-sessions";

/// Synchronous, stateless client for the focus API.
#[derive(Debug, Clone)]
pub struct FocusClient {
    base_url: String,
}

impl FocusClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/v1/auth/token`. The only request sent without a bearer
    /// token.
    pub fn build_request_token(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{TOKEN_PATH}", self.base_url),
            headers: headers(None),
            body: Some(to_json(credentials)?),
        })
    }

    pub fn build_start_focus_session(
        &self,
        token: &str,
        input: &StartFocusSession,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{FOCUS_SESSIONS_PATH}", self.base_url),
            headers: headers(Some(token)),
            body: Some(to_json(input)?),
        })
    }

    /// Double quotes in `details` are sent as single quotes. Nothing else
    /// in the event is rewritten.
    pub fn build_push_focus_event(
        &self,
        token: &str,
        session_id: i64,
        event: &FocusEvent,
    ) -> Result<HttpRequest, ApiError> {
        let event = FocusEvent {
            details: sanitize_details(&event.details),
            ..event.clone()
        };
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{FOCUS_SESSIONS_PATH}/{session_id}/events", self.base_url),
            headers: headers(Some(token)),
            body: Some(to_json(&event)?),
        })
    }

    pub fn build_end_focus_session(
        &self,
        token: &str,
        session_id: i64,
        input: &EndFocusSession,
    ) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{FOCUS_SESSIONS_PATH}/{session_id}/end", self.base_url),
            headers: headers(Some(token)),
            body: Some(to_json(input)?),
        })
    }

    /// Return the response body as-is. Error bodies are indistinguishable
    /// from success bodies here.
    pub fn parse_text(&self, response: HttpResponse) -> String {
        response.body
    }

    pub fn parse_request_token(&self, response: HttpResponse) -> Result<TokenResponse, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_start_focus_session(
        &self,
        response: HttpResponse,
    ) -> Result<FocusSessionCreated, ApiError> {
        check_status(&response, 201)?;
        from_json(&response.body)
    }

    pub fn parse_push_focus_event(
        &self,
        response: HttpResponse,
    ) -> Result<FocusEventRecorded, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    pub fn parse_end_focus_session(
        &self,
        response: HttpResponse,
    ) -> Result<FocusSessionEnded, ApiError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }
}

/// Replace every `"` with `'`.
pub fn sanitize_details(details: &str) -> String {
    details.replace('"', "'")
}

fn headers(token: Option<&str>) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(2);
    if let Some(token) = token {
        headers.push(("authorization".to_string(), format!("Bearer {token}")));
    }
    headers.push(("content-type".to_string(), "application/json".to_string()));
    headers
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let body = error_message(&response.body);
    match response.status {
        401 => Err(ApiError::Unauthorized { body }),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError { status, body }),
    }
}

/// Prefer the server's `{"error": ...}` message, fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.to_string())
}
