// SPDX-License-Identifier: MIT

//! OTP challenge service: issues and verifies one-time login codes.
//!
//! One live challenge per handle. Requesting again overwrites the prior
//! challenge and resets the expiry window; verification is a single
//! atomic compare-and-consume against the store.

use crate::models::OtpChallenge;
use crate::services::mailer::Mailer;
use crate::store::AuthStore;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use subtle::ConstantTimeEq;

/// Number of digits in a challenge code.
pub const OTP_CODE_LEN: usize = 6;

/// Errors surfaced by the challenge service.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("no identity matches that handle")]
    UnknownHandle,

    #[error("invalid or expired OTP")]
    InvalidOrExpired,

    #[error("OTP delivery failed: {0}")]
    Delivery(String),

    #[error("network failure: {0}")]
    Network(String),

    #[error("random source unavailable")]
    Rng,
}

/// The challenge service as seen by a login client.
///
/// Implemented by [`OtpService`] (in-process) and by
/// [`crate::client::OtpClient`] (over HTTP).
#[async_trait]
pub trait ChallengeApi: Send + Sync {
    async fn request_challenge(&self, handle: &str) -> Result<(), OtpError>;
    async fn verify_challenge(&self, handle: &str, code: &str) -> Result<(), OtpError>;
}

/// OTP challenge service.
#[derive(Clone)]
pub struct OtpService {
    store: AuthStore,
    mailer: Mailer,
    ttl: Duration,
}

impl OtpService {
    pub fn new(store: AuthStore, mailer: Mailer, ttl: Duration) -> Self {
        Self { store, mailer, ttl }
    }

    /// Issue a challenge for `handle` and dispatch it by email.
    ///
    /// Overwrites any prior challenge for the handle, invalidating its
    /// code. If delivery fails the stored challenge is rolled back (only
    /// if it is still the one this call stored), so the caller is never
    /// told "sent" without a live challenge behind it.
    pub async fn request_challenge(&self, handle: &str) -> Result<(), OtpError> {
        let identity = self
            .store
            .find_identity_by_handle(handle)
            .ok_or(OtpError::UnknownHandle)?;

        let code = generate_code()?;
        self.store.put_challenge(OtpChallenge {
            handle: handle.to_string(),
            code: code.clone(),
            issued_at: Utc::now(),
        });

        // The handle may be a phone number; the code always goes to the
        // email on file.
        if let Err(err) = self.mailer.send_otp_email(&identity.email, &code).await {
            self.store.remove_challenge_if(handle, |c| c.code == code);
            tracing::warn!(handle, error = %err, "OTP delivery failed, challenge rolled back");
            return Err(OtpError::Delivery(err.to_string()));
        }

        tracing::info!(handle, "OTP challenge issued");
        Ok(())
    }

    /// Verify a submitted code against the live challenge for `handle`.
    ///
    /// A match within the TTL consumes the challenge. A mismatch, a
    /// missing challenge, or an expired one all report the same
    /// `InvalidOrExpired` and leave the store unchanged.
    pub async fn verify_challenge(&self, handle: &str, code: &str) -> Result<(), OtpError> {
        let now = Utc::now();
        let ttl = self.ttl;

        let consumed = self.store.remove_challenge_if(handle, |challenge| {
            let code_matches: bool = challenge.code.as_bytes().ct_eq(code.as_bytes()).into();
            code_matches && !challenge.is_expired(now, ttl)
        });

        if consumed {
            tracing::info!(handle, "OTP verified");
            Ok(())
        } else {
            tracing::debug!(handle, "OTP rejected");
            Err(OtpError::InvalidOrExpired)
        }
    }
}

#[async_trait]
impl ChallengeApi for OtpService {
    async fn request_challenge(&self, handle: &str) -> Result<(), OtpError> {
        OtpService::request_challenge(self, handle).await
    }

    async fn verify_challenge(&self, handle: &str, code: &str) -> Result<(), OtpError> {
        OtpService::verify_challenge(self, handle, code).await
    }
}

/// Generate a 6-digit code from the system CSPRNG.
///
/// Samples from the truncated top of the u32 range are rejected so the
/// modulo is unbiased across the 900 000 possible codes.
fn generate_code() -> Result<String, OtpError> {
    const ZONE: u32 = (u32::MAX / 900_000) * 900_000;

    let rng = SystemRandom::new();
    loop {
        let mut buf = [0u8; 4];
        rng.fill(&mut buf).map_err(|_| OtpError::Rng)?;
        let n = u32::from_be_bytes(buf);
        if n < ZONE {
            return Ok(format!("{}", 100_000 + n % 900_000));
        }
    }
}
