//! C-ABI wrapper around `focus-core`.
//!
//! # Overview
//! Exposes the four focus API operations through `extern "C"` functions so a
//! desktop host with a C FFI can build requests and read responses while
//! doing the HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `focus_build_*` mirror the core builders 1:1 and return null on null or
//!   non-UTF-8 arguments.
//! - `focus_parse_text` hands back the raw body. The typed parsers return a
//!   single `FfiFocusResult` envelope with `FfiDataTag` + `void* data`.
//! - The C caller owns all returned pointers and must call the matching
//!   `focus_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use focus_core::http::HttpResponse;
use focus_core::types::{Credentials, EndFocusSession, FocusEvent, StartFocusSession};

use types::*;

/// Borrow a C string as `&str`. `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `FocusClient` bound to `base_url`.
///
/// Returns null if `base_url` is null, not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with `focus_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn focus_client_new(base_url: *const c_char) -> *mut FfiFocusClient {
    catch_unwind(|| {
        let Some(url) = (unsafe { c_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let client = focus_core::FocusClient::new(url);
        Box::into_raw(Box::new(FfiFocusClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a `FocusClient` created by `focus_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn focus_client_free(client: *mut FfiFocusClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the token request. No authorization header is attached.
///
/// The caller must free the returned pointer with `focus_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn focus_build_request_token(
    client: *const FfiFocusClient,
    email: *const c_char,
    password: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(email), Some(password)) = (unsafe { c_str(email) }, unsafe { c_str(password) })
        else {
            return std::ptr::null_mut();
        };
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        match client.inner.build_request_token(&credentials) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the start-session request.
#[unsafe(no_mangle)]
pub extern "C" fn focus_build_start_focus_session(
    client: *const FfiFocusClient,
    token: *const c_char,
    lesson_id: i64,
    quiz_id: i64,
    duration_seconds: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(token) = (unsafe { c_str(token) }) else {
            return std::ptr::null_mut();
        };
        let input = StartFocusSession {
            lesson_id,
            quiz_id,
            duration_seconds,
        };
        match client.inner.build_start_focus_session(token, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the push-event request. `details` may be null (sent as empty).
#[unsafe(no_mangle)]
pub extern "C" fn focus_build_push_focus_event(
    client: *const FfiFocusClient,
    token: *const c_char,
    session_id: i64,
    kind: *const c_char,
    severity: i64,
    details: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(token), Some(kind)) = (unsafe { c_str(token) }, unsafe { c_str(kind) }) else {
            return std::ptr::null_mut();
        };
        let details = if details.is_null() {
            ""
        } else {
            match unsafe { c_str(details) } {
                Some(d) => d,
                None => return std::ptr::null_mut(),
            }
        };
        let event = FocusEvent {
            kind: kind.to_string(),
            severity,
            details: details.to_string(),
        };
        match client.inner.build_push_focus_event(token, session_id, &event) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the end-session request.
#[unsafe(no_mangle)]
pub extern "C" fn focus_build_end_focus_session(
    client: *const FfiFocusClient,
    token: *const c_char,
    session_id: i64,
    status: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let (Some(token), Some(status)) = (unsafe { c_str(token) }, unsafe { c_str(status) })
        else {
            return std::ptr::null_mut();
        };
        let input = EndFocusSession {
            status: status.to_string(),
        };
        match client.inner.build_end_focus_session(token, session_id, &input) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null or non-UTF-8
/// body reads as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { c_str(resp.body) }.unwrap_or("").to_string();
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Return the response body unchanged, whatever the status.
///
/// Returns null if `client` or `response` is null. Free the result with
/// `focus_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn focus_parse_text(
    client: *const FfiFocusClient,
    response: *const FfiHttpResponse,
) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() || response.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        into_c_string(client.inner.parse_text(ffi_response_to_core(resp)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Parse a token response. `data_tag = Token` on success.
#[unsafe(no_mangle)]
pub extern "C" fn focus_parse_request_token(
    client: *const FfiFocusClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFocusResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFocusResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFocusResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_request_token(ffi_response_to_core(resp)) {
            Ok(token) => FfiFocusResult::ok_token(token),
            Err(e) => FfiFocusResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFocusResult::panic("panic in focus_parse_request_token"))
}

/// Parse a start-session response. `data_tag = SessionCreated` on success
/// (status 201).
#[unsafe(no_mangle)]
pub extern "C" fn focus_parse_start_focus_session(
    client: *const FfiFocusClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFocusResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFocusResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFocusResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_start_focus_session(ffi_response_to_core(resp)) {
            Ok(session) => FfiFocusResult::ok_session_created(session),
            Err(e) => FfiFocusResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFocusResult::panic("panic in focus_parse_start_focus_session"))
}

/// Parse a push-event response. `data_tag = EventRecorded` on success.
#[unsafe(no_mangle)]
pub extern "C" fn focus_parse_push_focus_event(
    client: *const FfiFocusClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFocusResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFocusResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFocusResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_push_focus_event(ffi_response_to_core(resp)) {
            Ok(recorded) => FfiFocusResult::ok_event_recorded(recorded),
            Err(e) => FfiFocusResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFocusResult::panic("panic in focus_parse_push_focus_event"))
}

/// Parse an end-session response. `data_tag = SessionEnded` on success.
#[unsafe(no_mangle)]
pub extern "C" fn focus_parse_end_focus_session(
    client: *const FfiFocusClient,
    response: *const FfiHttpResponse,
) -> *mut FfiFocusResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiFocusResult::null_arg("client");
        }
        if response.is_null() {
            return FfiFocusResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_end_focus_session(ffi_response_to_core(resp)) {
            Ok(session) => FfiFocusResult::ok_session_ended(session),
            Err(e) => FfiFocusResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiFocusResult::panic("panic in focus_parse_end_focus_session"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `focus_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn focus_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiFocusResult` returned by any typed `focus_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn focus_free_result(result: *mut FfiFocusResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Token => {
                let token = unsafe { Box::from_raw(result.data as *mut FfiToken) };
                free_c_string(token.token);
                free_c_string(token.token_type);
                free_c_string(token.expires_at);
                free_c_string(token.role);
            }
            FfiDataTag::SessionCreated => {
                let session = unsafe { Box::from_raw(result.data as *mut FfiSessionCreated) };
                free_c_string(session.status);
            }
            FfiDataTag::EventRecorded => {
                let recorded = unsafe { Box::from_raw(result.data as *mut FfiEventRecorded) };
                free_c_string(recorded.status);
            }
            FfiDataTag::SessionEnded => {
                let session = unsafe { Box::from_raw(result.data as *mut FfiSessionEnded) };
                free_c_string(session.status);
                free_c_string(session.ended_at);
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn focus_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
