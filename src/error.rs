// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// The wire format is always `{"error": string}`; recoverable auth
/// errors carry the exact messages the frontend matches on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Email or Phone not found")]
    HandleNotFound,

    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("Phone number or email already in use")]
    DuplicateIdentity,

    #[error("Failed to send OTP: {0}")]
    OtpDelivery(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            AppError::HandleNotFound => (StatusCode::BAD_REQUEST, "Email or Phone not found"),
            AppError::InvalidOrExpiredOtp => (StatusCode::BAD_REQUEST, "Invalid or expired OTP"),
            AppError::DuplicateIdentity => (
                StatusCode::BAD_REQUEST,
                "Phone number or email already in use",
            ),
            AppError::OtpDelivery(msg) => {
                tracing::error!(error = %msg, "OTP delivery failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send OTP")
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::services::otp::OtpError> for AppError {
    fn from(err: crate::services::otp::OtpError) -> Self {
        use crate::services::otp::OtpError;
        match err {
            OtpError::UnknownHandle => AppError::HandleNotFound,
            OtpError::InvalidOrExpired => AppError::InvalidOrExpiredOtp,
            OtpError::Delivery(msg) => AppError::OtpDelivery(msg),
            OtpError::Network(msg) => AppError::OtpDelivery(msg),
            OtpError::Rng => AppError::Store("random generator failure".to_string()),
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_error_mapping() {
        use crate::services::otp::OtpError;

        assert!(matches!(
            AppError::from(OtpError::UnknownHandle),
            AppError::HandleNotFound
        ));
        assert!(matches!(
            AppError::from(OtpError::InvalidOrExpired),
            AppError::InvalidOrExpiredOtp
        ));
        assert!(matches!(
            AppError::from(OtpError::Delivery("smtp down".to_string())),
            AppError::OtpDelivery(_)
        ));
    }
}
