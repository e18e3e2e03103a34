// SPDX-License-Identifier: MIT

//! OTP endpoints used by the login flow.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::routes::MessageResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/send-otp", post(send_otp))
        .route("/api/verify-otp", post(verify_otp))
}

/// The field is named `email` on the wire for frontend compatibility,
/// but carries whichever handle the user typed (email or phone).
#[derive(Deserialize)]
pub struct SendOtpRequest {
    email: String,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    email: String,
    otp: String,
}

/// Issue a challenge and email the code.
async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<MessageResponse>> {
    state.otp_service.request_challenge(&body.email).await?;
    Ok(MessageResponse::new("OTP sent"))
}

/// Verify a submitted code, consuming the challenge on success.
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .otp_service
        .verify_challenge(&body.email, &body.otp)
        .await?;
    Ok(MessageResponse::new("OTP verified"))
}
