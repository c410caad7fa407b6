//! API error handling module
//!
//! Provides a unified error type for all API endpoints. Verification failures
//! become `400` responses carrying the user-facing message and a stable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use verigate_core::VerificationError;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Human verification failed or could not be completed
    #[error(transparent)]
    Verification(#[from] VerificationError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Verification(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Verification(e) => match e {
                VerificationError::MissingEvidence => "CAPTCHA_MISSING",
                VerificationError::InvalidEvidence => "CAPTCHA_INVALID",
                VerificationError::ServiceUnavailable => "CAPTCHA_UNAVAILABLE",
            },
        }
    }

    /// Get the message shown to the client
    ///
    /// Verification errors carry only their user-facing text; upstream causes
    /// were already logged by the verification method.
    fn client_message(&self) -> String {
        self.to_string()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let internal_message = self.to_string();

        match &self {
            Self::BadRequest(_) => {
                tracing::warn!(
                    status = %status,
                    code = code,
                    error = %internal_message,
                    "Client error"
                );
            }
            Self::Verification(_) => {
                tracing::info!(
                    status = %status,
                    code = code,
                    error = %internal_message,
                    "Verification rejected"
                );
            }
        }

        let body = serde_json::json!({
            "error": self.client_message(),
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
