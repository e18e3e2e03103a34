// SPDX-License-Identifier: MIT

//! Registration confirmation flow.
//!
//! Signup creates an unconfirmed account with the identity provider and
//! sends a verification message out of band. This module polls the
//! provider's verification flag at a fixed interval until it flips,
//! then finalizes the profile exactly once: optional image upload, then
//! a single write with `registered = true`. The poll is cancellable and
//! bounded so a torn-down UI or a never-verified account cannot leave
//! an orphaned timer behind.

use crate::models::Identity;
use crate::services::BlobClient;
use crate::store::AuthStore;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use validator::{Validate, ValidationError};

/// Default spacing between verification checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default cap on verification checks (5 minutes at the default
/// interval).
pub const MAX_POLL_ATTEMPTS: u32 = 100;

/// Registration form fields.
#[derive(Debug, Clone, Validate)]
pub struct RegistrationRequest {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(custom(function = validate_phone))]
    pub phone: String,
    pub job_title: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub confirm_password: String,
    pub profile_image: Option<Vec<u8>>,
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 7 || digits > 15 || !phone.chars().all(|c| c.is_ascii_digit() || c == '+') {
        let mut err = ValidationError::new("phone");
        err.message = Some("phone must be 7-15 digits".into());
        return Err(err);
    }
    Ok(())
}

/// Signup errors. All are surfaced to the user as a message; the form
/// stays usable for a retry.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("{0}")]
    Invalid(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Phone number or email already in use")]
    DuplicateIdentity,

    #[error("profile image upload failed: {0}")]
    Upload(String),

    #[error("store error: {0}")]
    Store(String),
}

/// How a verification poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The verification flag flipped to true.
    Confirmed,
    /// The hosting UI tore the poller down.
    Cancelled,
    /// The attempt budget ran out before verification.
    GaveUp,
}

/// Result of driving a registration to completion.
#[derive(Debug)]
pub enum RegistrationOutcome {
    Completed(Identity),
    Cancelled,
    GaveUp,
}

/// Drives registration confirmation for one pending signup.
#[derive(Clone)]
pub struct RegistrationFlow {
    store: AuthStore,
    blob: BlobClient,
}

impl RegistrationFlow {
    pub fn new(store: AuthStore, blob: BlobClient) -> Self {
        Self { store, blob }
    }

    /// Pre-creation checks: field validation, password confirmation,
    /// and the duplicate-handle check against the handle index.
    pub fn validate(&self, request: &RegistrationRequest) -> Result<(), SignupError> {
        request
            .validate()
            .map_err(|e| SignupError::Invalid(e.to_string()))?;
        if request.password != request.confirm_password {
            return Err(SignupError::PasswordMismatch);
        }
        if self
            .store
            .handle_in_use(&[request.email.as_str(), request.phone.as_str()])
        {
            return Err(SignupError::DuplicateIdentity);
        }
        Ok(())
    }

    /// Poll the externally-owned verification flag until it is set, the
    /// flow is cancelled, or the attempt budget runs out.
    ///
    /// The first check happens one interval after the call, matching
    /// the cadence of the verification email round-trip. Dropping the
    /// cancel sender counts as cancellation, so teardown is guaranteed
    /// to stop the timer.
    pub async fn await_verification<F, Fut>(
        &self,
        mut check: F,
        interval: Duration,
        max_attempts: u32,
        mut cancel: watch::Receiver<bool>,
    ) -> PollOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval() fires immediately; consume the zeroth tick so each
        // attempt waits a full interval.
        ticker.tick().await;

        let mut attempts = 0;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    attempts += 1;
                    if check().await {
                        tracing::info!(attempts, "registration verified");
                        return PollOutcome::Confirmed;
                    }
                    if attempts >= max_attempts {
                        tracing::warn!(attempts, "giving up on registration verification");
                        return PollOutcome::GaveUp;
                    }
                }
                changed = cancel.changed() => {
                    match changed {
                        Err(_) => return PollOutcome::Cancelled,
                        Ok(()) if *cancel.borrow() => return PollOutcome::Cancelled,
                        Ok(()) => {}
                    }
                }
            }
        }
    }

    /// One-time finalization after verification: upload the profile
    /// image if provided, then write the full profile with
    /// `registered = true`.
    pub async fn finalize(
        &self,
        uid: &str,
        request: &RegistrationRequest,
        now: DateTime<Utc>,
    ) -> Result<Identity, SignupError> {
        let image_url = match &request.profile_image {
            Some(bytes) => self
                .blob
                .upload_profile_image(uid, bytes.clone())
                .await
                .map_err(|e| SignupError::Upload(e.to_string()))?,
            None => String::new(),
        };

        let identity = Identity {
            id: uid.to_string(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            phone: request.phone.clone(),
            job_title: request.job_title.clone(),
            register_date: format_utc_rfc3339(now),
            is_active: false,
            image_url,
            registered: true,
        };

        self.store
            .create_identity(identity.clone())
            .map_err(|_| SignupError::DuplicateIdentity)?;

        tracing::info!(identity_id = uid, "registration finalized");
        Ok(identity)
    }

    /// Drive the whole confirmation: poll the flag, then finalize
    /// exactly once on success.
    pub async fn run<F, Fut>(
        &self,
        uid: &str,
        request: &RegistrationRequest,
        check: F,
        interval: Duration,
        max_attempts: u32,
        cancel: watch::Receiver<bool>,
    ) -> Result<RegistrationOutcome, SignupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        match self
            .await_verification(check, interval, max_attempts, cancel)
            .await
        {
            PollOutcome::Confirmed => {
                let identity = self.finalize(uid, request, Utc::now()).await?;
                Ok(RegistrationOutcome::Completed(identity))
            }
            PollOutcome::Cancelled => Ok(RegistrationOutcome::Cancelled),
            PollOutcome::GaveUp => Ok(RegistrationOutcome::GaveUp),
        }
    }
}
