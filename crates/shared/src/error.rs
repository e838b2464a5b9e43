use serde::{Deserialize, Serialize};

/// Rejection categories the processing service may report in an error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    UnsupportedFormat,
    PayloadTooLarge,
    RateLimited,
    Internal,
    #[serde(other)]
    Unknown,
}

/// Structured error body, e.g. `{"code":"validation","message":"width too large"}`.
///
/// Only read for diagnostics. Users always see the generic upload error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default = "unknown_code")]
    pub code: ErrorCode,
    pub message: String,
}

fn unknown_code() -> ErrorCode {
    ErrorCode::Unknown
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Parses a response body, returning `None` when it is not a structured error.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }
}
