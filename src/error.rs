//! Error codes and the HTTP error response.
//!
//! DESIGN
//! ======
//! Every layer keeps its own `thiserror` enum and implements [`ErrorCode`].
//! Handlers return [`ApiError`], which maps each code to a status exactly
//! once and renders `{ error, message, retryable }`. Generation failures of
//! any kind share one public message; their detail only reaches the log.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use crate::inflight::InflightError;
use crate::services::history::HistoryError;
use crate::services::image::ImageError;
use crate::services::listing::ListingError;
use crate::services::negotiation::NegotiationError;

/// Shown for any failed AI call, whatever the cause.
pub const GENERATION_FAILED_MESSAGE: &str = "Terjadi kesalahan pada AI. Silakan coba lagi.";

const STORAGE_FAILED_MESSAGE: &str = "History could not be saved. Please try again.";
const INTERNAL_MESSAGE: &str = "Something went wrong. Please try again.";
const NOT_CONFIGURED_MESSAGE: &str = "The AI service is not configured on this server.";

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// API ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Listing(#[from] ListingError),
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Inflight(#[from] InflightError),
    #[error("{0}")]
    BadRequest(String),
    /// An extractor refused the request body; `status` is its verdict.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Image(e) => e.error_code(),
            Self::Listing(e) => e.error_code(),
            Self::Negotiation(e) => e.error_code(),
            Self::History(e) => e.error_code(),
            Self::Inflight(e) => e.error_code(),
            Self::BadRequest(_) => "E_BAD_REQUEST",
            Self::Rejected { status, .. } => match *status {
                StatusCode::PAYLOAD_TOO_LARGE => "E_BODY_TOO_LARGE",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "E_UNSUPPORTED_MEDIA_TYPE",
                _ => "E_BAD_REQUEST",
            },
            Self::Internal(_) => "E_INTERNAL",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Image(e) => e.retryable(),
            Self::Listing(e) => e.retryable(),
            Self::Negotiation(e) => e.retryable(),
            Self::History(e) => e.retryable(),
            Self::Inflight(e) => e.retryable(),
            Self::BadRequest(_) | Self::Rejected { .. } => false,
            Self::Internal(_) => true,
        }
    }
}

impl ApiError {
    /// Keep size and media-type verdicts; any other refusal of the body is
    /// a plain 400.
    #[must_use]
    pub fn rejected(status: StatusCode, message: String) -> Self {
        let status = match status {
            StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE => status,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::Rejected { status, message }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        if let Self::Rejected { status, .. } = self {
            return *status;
        }
        match self.error_code() {
            "E_GENERATION_FAILED" => StatusCode::BAD_GATEWAY,
            "E_LLM_NOT_CONFIGURED" => StatusCode::SERVICE_UNAVAILABLE,
            "E_REQUEST_IN_FLIGHT" => StatusCode::CONFLICT,
            "E_HISTORY_NOT_FOUND" => StatusCode::NOT_FOUND,
            "E_STORAGE_FAILED" | "E_INTERNAL" => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Text safe to show the user.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.error_code() {
            "E_GENERATION_FAILED" => GENERATION_FAILED_MESSAGE.to_string(),
            "E_LLM_NOT_CONFIGURED" => NOT_CONFIGURED_MESSAGE.to_string(),
            "E_STORAGE_FAILED" => STORAGE_FAILED_MESSAGE.to_string(),
            "E_INTERNAL" => INTERNAL_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::rejected(e.status(), e.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        Self::rejected(e.status(), e.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::rejected(e.status(), e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();
        if status.is_server_error() {
            error!(error = %self, code, status = status.as_u16(), "request failed");
        } else {
            warn!(error = %self, code, status = status.as_u16(), "request rejected");
        }

        let body = serde_json::json!({
            "error": code,
            "message": self.public_message(),
            "retryable": self.retryable(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
