// SPDX-License-Identifier: MIT

//! HTTP client for the OTP endpoints.
//!
//! Implements [`ChallengeApi`] against a remote teamdir server, mapping
//! the wire statuses back onto [`OtpError`] so the login state machine
//! behaves identically in-process and over the network.

use crate::services::otp::{ChallengeApi, OtpError};
use async_trait::async_trait;
use reqwest::StatusCode;

/// Client for `POST /api/send-otp` and `POST /api/verify-otp`.
#[derive(Clone)]
pub struct OtpClient {
    http: reqwest::Client,
    base_url: String,
}

impl OtpClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl ChallengeApi for OtpClient {
    async fn request_challenge(&self, handle: &str) -> Result<(), OtpError> {
        let url = format!("{}/api/send-otp", self.base_url);
        let body = serde_json::json!({ "email": handle });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OtpError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(OtpError::UnknownHandle),
            status => Err(OtpError::Delivery(format!("send-otp returned {status}"))),
        }
    }

    async fn verify_challenge(&self, handle: &str, code: &str) -> Result<(), OtpError> {
        let url = format!("{}/api/verify-otp", self.base_url);
        let body = serde_json::json!({ "email": handle, "otp": code });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OtpError::Network(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::BAD_REQUEST => Err(OtpError::InvalidOrExpired),
            status => Err(OtpError::Network(format!("verify-otp returned {status}"))),
        }
    }
}
