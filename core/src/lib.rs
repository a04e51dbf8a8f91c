//! Synchronous API client for the study-companion focus service.
//!
//! # Overview
//! Four POST operations: request a token, start a focus session, push a
//! focus event, end a focus session. `FocusClient` builds `HttpRequest`
//! values and reads `HttpResponse` values without touching the network;
//! `FocusApi` runs the round-trip over a blocking ureq agent and returns the
//! raw response text.
//!
//! # Design
//! - `FocusClient` is stateless; it holds only `base_url`.
//! - Request bodies come from typed serde structs, never string formatting.
//! - Only transport failures surface on the raw-text path. Status handling is
//!   left to the caller, or to the opt-in typed `parse_*` methods.
//! - Types use owned `String` / `Vec` fields so they map onto the FFI crate.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::FocusClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::FocusApi;
pub use types::{
    Credentials, EndFocusSession, ErrorBody, FocusEvent, FocusEventRecorded, FocusSessionCreated,
    FocusSessionEnded, FocusSessionStatus, FocusViolationType, StartFocusSession, TokenResponse,
};
