//! Error types for the client.
//!
//! Network outcomes never surface as `Err`/panics: they are folded into [`ApiError`] and returned
//! on the `Left` side of an [`Either`](crate::Either). The remaining error enums cover
//! construction mistakes and local quota refusal, which are ordinary `Result` errors.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

const DAILY_QUOTA_MESSAGE: &str = "Daily request quota exhausted";

/// Uniform failure value for every dispatcher call.
///
/// `status` is the HTTP status, or `0` when no response was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{status} {status_text}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub status_text: String,
    pub message: String,
    /// Upstream body (JSON if it parsed, raw text otherwise) or transport diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Connection refused, DNS failure, timeout before any response.
    pub fn no_response(details: impl Into<String>) -> Self {
        Self {
            status: 0,
            status_text: "No Response".into(),
            message: "No response received from server".into(),
            details: Some(Value::String(details.into())),
        }
    }

    /// The request could not be built or sent at all.
    pub fn request_setup(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "An error occurred while setting up the request".to_string()
        } else {
            message
        };
        Self {
            status: 0,
            status_text: "Request Error".into(),
            details: Some(Value::String(message.clone())),
            message,
        }
    }

    /// A response body did not match the expected shape.
    pub fn validation(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            status: 400,
            status_text: "Validation Error".into(),
            message: message.into(),
            details: Some(Value::String(details.into())),
        }
    }

    /// A lookup inside a successfully fetched payload came up empty.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: 404,
            status_text: "Not Found".into(),
            message: message.into(),
            details: None,
        }
    }

    /// The local per-day quota refused the request before it was sent.
    pub fn daily_quota_exhausted(limit: u32) -> Self {
        Self {
            status: 429,
            status_text: "Too Many Requests".into(),
            message: DAILY_QUOTA_MESSAGE.into(),
            details: Some(serde_json::json!({ "requestsPerDay": limit })),
        }
    }

    /// Classify an HTTP error response.
    ///
    /// Precedence for `status`/`message`: nested `{status: {status_code, message}}` object, then
    /// a flat numeric `status`, then the HTTP status with the static message table. A
    /// top-level string `statusText`/`message` in the body overrides the derived text.
    pub fn from_http(status: u16, status_text: &str, body: &[u8]) -> Self {
        let details = body_details(body);
        // serde would also accept a positional array for the struct
        let parsed = details
            .as_ref()
            .filter(|v| v.is_object())
            .and_then(|v| serde_json::from_value::<ErrorBody>(v.clone()).ok())
            .unwrap_or_default();

        let mut status = status;
        let mut status_text = status_text.to_string();
        let mut message = status_message(status).into_owned();

        match parsed.status {
            Some(StatusField::Nested(NestedStatus { status_code: Some(code), message: nested }))
                if code != 0 =>
            {
                status = code;
                if let Some(nested) = nested.filter(|m| !m.is_empty()) {
                    message = nested;
                }
            }
            Some(StatusField::Code(code)) => status = code,
            _ => {}
        }
        if let Some(text) = parsed.status_text.as_ref().and_then(Value::as_str) {
            if !text.is_empty() {
                status_text = text.to_string();
            }
        }
        if let Some(text) = parsed.message.as_ref().and_then(Value::as_str) {
            if !text.is_empty() {
                message = text.to_string();
            }
        }

        Self { status, status_text, message, details }
    }

    pub fn is_transport(&self) -> bool {
        self.status == 0
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Refused locally because the per-day quota is spent; nothing was sent.
    pub fn is_daily_quota_exhausted(&self) -> bool {
        self.status == 429
            && self.message == DAILY_QUOTA_MESSAGE
            && self.details.as_ref().and_then(|d| d.get("requestsPerDay")).is_some()
    }

    /// 4xx other than 429 are permanent, and so is a spent daily quota until local midnight.
    /// Everything else may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        if self.is_daily_quota_exhausted() {
            return false;
        }
        !self.is_client_error() || self.is_rate_limited()
    }
}

fn body_details(body: &[u8]) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    Some(
        serde_json::from_slice(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned())),
    )
}

/// Human-readable text for well-known status codes.
pub fn status_message(status: u16) -> Cow<'static, str> {
    match status {
        400 => "Bad Request - Invalid parameters provided".into(),
        401 => "Unauthorized - Invalid API key".into(),
        403 => "Forbidden - API key does not have access to this endpoint".into(),
        404 => "Not Found - The requested resource was not found".into(),
        429 => "Too Many Requests - Rate limit exceeded".into(),
        500 => "Internal Server Error - Riot Games server error".into(),
        502 => "Bad Gateway - Riot Games server is down".into(),
        503 => "Service Unavailable - Riot Games service is temporarily unavailable".into(),
        504 => "Gateway Timeout - Riot Games server timeout".into(),
        other => format!("HTTP Error {other}").into(),
    }
}

/// Error payload shape returned by the upstream API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    status: Option<StatusField>,
    #[serde(default)]
    status_text: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatusField {
    Nested(NestedStatus),
    Code(u16),
    #[allow(dead_code)]
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct NestedStatus {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}

/// Failure below HTTP: nothing usable came back from the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request was sent (or attempted) but no response arrived.
    #[error("no response received: {0}")]
    NoResponse(String),
    /// The request could not be constructed.
    #[error("request setup failed: {0}")]
    Request(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse(reason) => ApiError::no_response(reason),
            TransportError::Request(reason) => ApiError::request_setup(reason),
        }
    }
}

/// Invalid client or limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API key is required")]
    MissingApiKey,
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("rate limit {field} must be greater than zero")]
    InvalidRateLimit { field: &'static str },
    #[error("unknown platform {0:?}")]
    UnknownPlatform(String),
    #[error("unknown region {0:?}")]
    UnknownRegion(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Local rate limiter refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("daily request quota of {limit} exhausted")]
    DailyQuotaExhausted { limit: u32 },
}
