//! Blocking transport that executes `HttpRequest` values with ureq.
//!
//! # Design
//! The agent is built with `http_status_as_error(false)`, so 4xx/5xx
//! responses come back as data and only connection-level failures become
//! `ApiError::Transport`. The four operation methods compose build, send and
//! `parse_text`; callers wanting typed results can pair `execute` with the
//! `FocusClient::parse_*` methods.

use tracing::{debug, warn};

use crate::client::FocusClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, EndFocusSession, FocusEvent, StartFocusSession};

/// Focus API client that performs the network round-trip itself.
#[derive(Clone)]
pub struct FocusApi {
    client: FocusClient,
    agent: ureq::Agent,
}

impl FocusApi {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            client: FocusClient::new(&config.base_url),
            agent,
        }
    }

    pub fn client(&self) -> &FocusClient {
        &self.client
    }

    /// Send `req` and read the whole body as text.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), path = %req.path, "sending request");

        let result = match req.method {
            HttpMethod::Post => {
                let mut builder = self.agent.post(req.path.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| {
            warn!(path = %req.path, error = %e, "request failed");
            ApiError::from(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        // Bodies that are not valid UTF-8 are still server answers; decode lossily.
        let bytes = response.body_mut().read_to_vec().map_err(|e| {
            warn!(path = %req.path, error = %e, "failed to read response body");
            ApiError::from(e)
        })?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn send_text(&self, req: HttpRequest) -> Result<String, ApiError> {
        let response = self.execute(req)?;
        Ok(self.client.parse_text(response))
    }

    pub fn request_token(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let req = self.client.build_request_token(&credentials)?;
        self.send_text(req)
    }

    pub fn start_focus_session(
        &self,
        token: &str,
        lesson_id: i64,
        quiz_id: i64,
        duration_seconds: i64,
    ) -> Result<String, ApiError> {
        let input = StartFocusSession {
            lesson_id,
            quiz_id,
            duration_seconds,
        };
        let req = self.client.build_start_focus_session(token, &input)?;
        self.send_text(req)
    }

    pub fn push_focus_event(
        &self,
        token: &str,
        session_id: i64,
        kind: &str,
        severity: i64,
        details: &str,
    ) -> Result<String, ApiError> {
        let event = FocusEvent {
            kind: kind.to_string(),
            severity,
            details: details.to_string(),
        };
        let req = self.client.build_push_focus_event(token, session_id, &event)?;
        self.send_text(req)
    }

    pub fn end_focus_session(
        &self,
        token: &str,
        session_id: i64,
        status: &str,
    ) -> Result<String, ApiError> {
        let input = EndFocusSession {
            status: status.to_string(),
        };
        let req = self.client.build_end_focus_session(token, session_id, &input)?;
        self.send_text(req)
    }
}
