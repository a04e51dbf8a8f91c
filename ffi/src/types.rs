//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use focus_core::error::ApiError;
use focus_core::http::HttpMethod;
use focus_core::types::{FocusEventRecorded, FocusSessionCreated, FocusSessionEnded, TokenResponse};

/// Opaque handle to a `FocusClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiFocusClient {
    pub(crate) inner: focus_core::FocusClient,
}

/// Move `s` onto the C heap. Interior NULs are stripped; JSON bodies never
/// contain raw NULs, so only caller-supplied header values can lose bytes.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    let bytes: Vec<u8> = s.into_bytes().into_iter().filter(|b| *b != 0).collect();
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `focus_build_*` functions. The C caller executes the request and
/// reads the response back through `focus_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: focus_core::HttpRequest) -> *mut Self {
        let path = into_c_string(req.path);
        let body = match req.body {
            Some(b) => into_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request. The
/// FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiFocusResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Unauthorized = 1,
    NotFound = 2,
    Http = 3,
    Deserialization = 4,
    Serialization = 5,
    Transport = 6,
    Panic = 7,
    NullArg = 8,
}

/// Tag that tells `focus_free_result` what `FfiFocusResult::data` points to.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Token = 1,
    SessionCreated = 2,
    EventRecorded = 3,
    SessionEnded = 4,
}

#[repr(C)]
pub struct FfiToken {
    pub token: *mut c_char,
    pub token_type: *mut c_char,
    pub expires_at: *mut c_char,
    pub role: *mut c_char,
}

#[repr(C)]
pub struct FfiSessionCreated {
    pub id: i64,
    pub status: *mut c_char,
    pub duration_seconds: i64,
}

#[repr(C)]
pub struct FfiEventRecorded {
    pub status: *mut c_char,
}

/// `ended_at` is null when the server sent no end time.
#[repr(C)]
pub struct FfiSessionEnded {
    pub id: i64,
    pub status: *mut c_char,
    pub ended_at: *mut c_char,
}

/// Result envelope for the typed parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiFocusResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiFocusResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiFocusResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiFocusResult {
            error_code,
            error_message: into_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_token(token: TokenResponse) -> *mut Self {
        let ffi_token = Box::new(FfiToken {
            token: into_c_string(token.token),
            token_type: into_c_string(token.token_type),
            expires_at: into_c_string(token.expires_at),
            role: into_c_string(token.role),
        });
        Self::ok(FfiDataTag::Token, Box::into_raw(ffi_token) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_session_created(session: FocusSessionCreated) -> *mut Self {
        let ffi_session = Box::new(FfiSessionCreated {
            id: session.id,
            status: into_c_string(session.status.as_str().to_string()),
            duration_seconds: session.duration_seconds,
        });
        Self::ok(
            FfiDataTag::SessionCreated,
            Box::into_raw(ffi_session) as *mut std::ffi::c_void,
        )
    }

    pub(crate) fn ok_event_recorded(recorded: FocusEventRecorded) -> *mut Self {
        let ffi_recorded = Box::new(FfiEventRecorded {
            status: into_c_string(recorded.status),
        });
        Self::ok(
            FfiDataTag::EventRecorded,
            Box::into_raw(ffi_recorded) as *mut std::ffi::c_void,
        )
    }

    pub(crate) fn ok_session_ended(session: FocusSessionEnded) -> *mut Self {
        let ffi_session = Box::new(FfiSessionEnded {
            id: session.id,
            status: into_c_string(session.status.as_str().to_string()),
            ended_at: session
                .ended_at
                .map(into_c_string)
                .unwrap_or(std::ptr::null_mut()),
        });
        Self::ok(
            FfiDataTag::SessionEnded,
            Box::into_raw(ffi_session) as *mut std::ffi::c_void,
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = match &err {
            ApiError::Unauthorized { .. } => (FfiErrorCode::Unauthorized, 401),
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
        };
        Self::err(error_code, http_status, err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
