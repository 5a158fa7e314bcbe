//! Function Compute error types.
//!
//! FC returns errors as a JSON body of the form
//! `{"ErrorCode": "ServiceNotFound", "ErrorMessage": "..."}` together with the
//! `x-fc-request-id` header. This module folds those, plus local failures
//! (transport, packaging, decoding), into a single error type whose
//! [`FcErrorKind`] lets callers branch on "stale write" vs "bad input".

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad classification of an [`FcError`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FcErrorKind {
    /// The server rejected malformed or conflicting input.
    Validation,
    /// An `If-Match` precondition did not match the current ETag.
    PreconditionFailed,
    /// The referenced service, function, trigger or resource does not exist.
    NotFound,
    /// A payload could not be decoded (log tail, response body).
    Decode,
    /// A trigger configuration variant disagrees with its trigger type.
    TypeMismatch,
    /// Any other non-2xx answer (auth, throttling, server faults).
    Service,
    /// The request never produced an HTTP response.
    Transport,
    /// Local file access while packaging function code.
    Io,
    /// Client configuration or a request URL was unusable; nothing was sent.
    Config,
}

impl fmt::Display for FcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FcErrorKind::Validation => "validation",
            FcErrorKind::PreconditionFailed => "precondition",
            FcErrorKind::NotFound => "not-found",
            FcErrorKind::Decode => "decode",
            FcErrorKind::TypeMismatch => "type-mismatch",
            FcErrorKind::Service => "service",
            FcErrorKind::Transport => "transport",
            FcErrorKind::Io => "io",
            FcErrorKind::Config => "config",
        };
        f.write_str(s)
    }
}

/// Top-level error type for all FC operations.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{}", self.render())]
pub struct FcError {
    pub kind: FcErrorKind,
    /// FC error code (e.g. "ServiceNotFound", "PreconditionFailed").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code, 0 when no response was received.
    pub status_code: u16,
    /// Value of `x-fc-request-id` when the server answered.
    pub request_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "ErrorCode", default)]
    error_code: Option<String>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<String>,
}

impl FcError {
    pub fn new(kind: FcErrorKind, code: &str, message: &str, status_code: u16) -> Self {
        Self {
            kind,
            code: code.to_string(),
            message: message.to_string(),
            status_code,
            request_id: None,
        }
    }

    /// Build a trigger variant mismatch error.
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::new(
            FcErrorKind::TypeMismatch,
            "TriggerTypeMismatch",
            &format!("expected '{}' trigger configuration, found '{}'", expected, actual),
            0,
        )
    }

    /// Build a decode error.
    pub fn decode(message: &str) -> Self {
        Self::new(FcErrorKind::Decode, "DecodeError", message, 0)
    }

    /// Build a local configuration error.
    pub fn config(message: &str) -> Self {
        Self::new(FcErrorKind::Config, "InvalidConfiguration", message, 0)
    }

    pub fn with_request_id(mut self, id: Option<String>) -> Self {
        self.request_id = id;
        self
    }

    /// Classify an HTTP status / FC error code pair.
    pub fn classify(code: &str, status_code: u16) -> FcErrorKind {
        if status_code == 412 || code == "PreconditionFailed" {
            FcErrorKind::PreconditionFailed
        } else if status_code == 404 || code.ends_with("NotFound") {
            FcErrorKind::NotFound
        } else if matches!(status_code, 400 | 409 | 413) {
            FcErrorKind::Validation
        } else {
            FcErrorKind::Service
        }
    }

    /// Parse an FC JSON error response.
    pub fn from_response(status_code: u16, body: &[u8], request_id: Option<String>) -> Self {
        let parsed = serde_json::from_slice::<ErrorBody>(body).ok();
        let code = parsed
            .as_ref()
            .and_then(|b| b.error_code.clone())
            .unwrap_or_else(|| format!("HTTP{}", status_code));
        let message = parsed
            .and_then(|b| b.error_message)
            .unwrap_or_else(|| String::from_utf8_lossy(body).chars().take(200).collect());
        let kind = Self::classify(&code, status_code);
        Self::new(kind, &code, &message, status_code).with_request_id(request_id)
    }

    /// Whether the server signalled a transient condition. The client never
    /// retries on its own.
    pub fn retryable(&self) -> bool {
        matches!(self.status_code, 429 | 500 | 502 | 503 | 504)
            || self.code == "ResourceThrottled"
            || self.code == "ResourceExhausted"
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == FcErrorKind::NotFound
    }

    pub fn is_precondition_failed(&self) -> bool {
        self.kind == FcErrorKind::PreconditionFailed
    }

    fn render(&self) -> String {
        let mut s = format!("FC {} error [{}]: {}", self.kind, self.code, self.message);
        if self.status_code != 0 {
            s.push_str(&format!(" (HTTP {})", self.status_code));
        }
        if let Some(ref id) = self.request_id {
            s.push_str(&format!(" [RequestId: {}]", id));
        }
        s
    }
}

impl From<reqwest::Error> for FcError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(
            FcErrorKind::Transport,
            "HttpError",
            &err.to_string(),
            err.status().map(|s| s.as_u16()).unwrap_or(0),
        )
    }
}

impl From<serde_json::Error> for FcError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(&err.to_string())
    }
}

impl From<std::io::Error> for FcError {
    fn from(err: std::io::Error) -> Self {
        Self::new(FcErrorKind::Io, "IoError", &err.to_string(), 0)
    }
}

impl From<zip::result::ZipError> for FcError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::new(FcErrorKind::Io, "ZipError", &err.to_string(), 0)
    }
}

/// Convenience result type for FC operations.
pub type FcResult<T> = Result<T, FcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FcError::new(FcErrorKind::NotFound, "ServiceNotFound", "service 'x' does not exist", 404);
        let s = err.to_string();
        assert!(s.contains("not-found"));
        assert!(s.contains("ServiceNotFound"));
        assert!(s.contains("404"));
    }

    #[test]
    fn error_display_with_request_id() {
        let err = FcError::new(FcErrorKind::Service, "AccessDenied", "denied", 403)
            .with_request_id(Some("req-abc-123".into()));
        assert!(err.to_string().contains("req-abc-123"));
    }

    #[test]
    fn parse_fc_error_body() {
        let body = br#"{"ErrorCode":"ServiceAlreadyExists","ErrorMessage":"service 'demo' already exists"}"#;
        let err = FcError::from_response(409, body, Some("r-1".into()));
        assert_eq!(err.kind, FcErrorKind::Validation);
        assert_eq!(err.code, "ServiceAlreadyExists");
        assert!(err.message.contains("already exists"));
        assert_eq!(err.request_id.as_deref(), Some("r-1"));
    }

    #[test]
    fn precondition_is_distinct_from_validation() {
        let body = br#"{"ErrorCode":"PreconditionFailed","ErrorMessage":"etag mismatch"}"#;
        let err = FcError::from_response(412, body, None);
        assert!(err.is_precondition_failed());
        assert_ne!(err.kind, FcErrorKind::Validation);
    }

    #[test]
    fn local_config_error_is_not_validation() {
        let err = FcError::config("ENDPOINT is not set");
        assert_eq!(err.kind, FcErrorKind::Config);
        assert_ne!(err.kind, FcErrorKind::Validation);
        assert!(!err.retryable());
    }

    #[test]
    fn not_found_by_code() {
        let body = br#"{"ErrorCode":"TriggerNotFound","ErrorMessage":"gone"}"#;
        assert!(FcError::from_response(404, body, None).is_not_found());
        assert_eq!(FcError::classify("FunctionNotFound", 400), FcErrorKind::NotFound);
    }

    #[test]
    fn non_json_body_keeps_text() {
        let err = FcError::from_response(502, b"Bad Gateway", None);
        assert_eq!(err.code, "HTTP502");
        assert_eq!(err.message, "Bad Gateway");
        assert_eq!(err.kind, FcErrorKind::Service);
        assert!(err.retryable());
    }

    #[test]
    fn not_retryable_validation() {
        let err = FcError::new(FcErrorKind::Validation, "InvalidArgument", "bad", 400);
        assert!(!err.retryable());
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let err = FcError::type_mismatch("oss", "http");
        assert_eq!(err.kind, FcErrorKind::TypeMismatch);
        assert!(err.message.contains("oss"));
        assert!(err.message.contains("http"));
    }

    #[test]
    fn serde_roundtrip() {
        let err = FcError::new(FcErrorKind::PreconditionFailed, "PreconditionFailed", "stale", 412)
            .with_request_id(Some("r-123".into()));
        let json = serde_json::to_string(&err).unwrap();
        let back: FcError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, FcErrorKind::PreconditionFailed);
        assert_eq!(back.request_id.as_deref(), Some("r-123"));
    }
}
