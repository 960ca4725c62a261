//! Error taxonomy for the API client.

use reqwest::StatusCode;
use thiserror::Error;

use crate::types::Navigation;

/// Fallback detail used when the backend gives no usable error text.
pub const GENERIC_ERROR_DETAIL: &str = "The server returned an unexpected error.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before any network call was made.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    /// The request never produced a response (DNS, connect, timeout).
    #[error("request failed: {message}")]
    Request { message: String },
    /// The response body could not be read.
    #[error("failed to read response: {message}")]
    Read { message: String },
    /// Non-success status; `detail` is the backend's message when present.
    #[error("{status}: {detail}")]
    Http { status: StatusCode, detail: String },
    /// The response body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode { message: String },
    /// A non-auth endpoint answered 401: the stored token is already
    /// cleared and the caller must honor the navigation intent.
    #[error("session expired")]
    SessionExpired { redirect: Navigation },
}

impl ApiError {
    /// Backend-provided detail text, if this failure carries one.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => Some(detail),
            _ => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Maps a non-success response body to [`ApiError::Http`].
///
/// The backend reports failures as `{"detail": "..."}`; a bare text body is
/// used as-is and an empty one falls back to [`GENERIC_ERROR_DETAIL`].
pub(crate) fn http_error(status: StatusCode, body: &[u8]) -> ApiError {
    let detail = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        })
        .or_else(|| non_empty_text(body))
        .unwrap_or_else(|| GENERIC_ERROR_DETAIL.to_string());
    ApiError::Http { status, detail }
}

fn non_empty_text(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
