// SPDX-License-Identifier: MIT

//! Login state machine.
//!
//! Drives one client instance through password entry, OTP request,
//! OTP confirmation, and session creation:
//!
//! `AwaitingCredentials → PasswordVerified → OtpRequested →
//! OtpVerifying → Authenticated`, with `Failed(reason)` reachable from
//! any state and `reset()` back to the start. The machine runs
//! single-threaded per client; each network call is a suspension point.

use crate::middleware::auth::create_session_jwt;
use crate::models::{FederatedProfile, Identity, SessionId};
use crate::services::otp::{ChallengeApi, OtpError};
use crate::services::PresenceTracker;
use crate::store::AuthStore;
use chrono::{DateTime, Duration, Utc};

/// Seconds before the resend button unlocks after a request.
pub const RESEND_COOLDOWN_SECS: i64 = 60;

/// Login flow errors. Everything except `NetworkFailure` leaves the
/// machine in a usable state for a retry.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Email or Phone not found")]
    HandleNotFound,

    #[error("a password is required")]
    MissingPassword,

    #[error("the code must be exactly 6 digits")]
    MalformedCode,

    #[error("invalid or expired OTP")]
    InvalidOrExpired,

    #[error("resend available in {0} seconds")]
    ResendNotReady(i64),

    #[error("operation not valid in the current login state")]
    InvalidState,

    #[error("network failure: {0}")]
    NetworkFailure(String),
}

/// Observable state of a login flow.
#[derive(Debug, Clone)]
pub enum LoginState {
    AwaitingCredentials,
    PasswordVerified,
    OtpRequested {
        requested_at: DateTime<Utc>,
    },
    OtpVerifying,
    Authenticated {
        identity_id: String,
        session_id: SessionId,
        token: String,
    },
    Failed {
        reason: String,
    },
}

/// One client's login flow.
pub struct LoginFlow<C: ChallengeApi> {
    store: AuthStore,
    presence: PresenceTracker,
    challenge_api: C,
    jwt_signing_key: Vec<u8>,
    state: LoginState,
    handle: Option<String>,
    identity_id: Option<String>,
}

impl<C: ChallengeApi> LoginFlow<C> {
    pub fn new(
        store: AuthStore,
        presence: PresenceTracker,
        challenge_api: C,
        jwt_signing_key: Vec<u8>,
    ) -> Self {
        Self {
            store,
            presence,
            challenge_api,
            jwt_signing_key,
            state: LoginState::AwaitingCredentials,
            handle: None,
            identity_id: None,
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Restart the flow from the beginning (also the way out of
    /// `Failed`).
    pub fn reset(&mut self) {
        self.state = LoginState::AwaitingCredentials;
        self.handle = None;
        self.identity_id = None;
    }

    /// Submit handle and password. Success moves to `PasswordVerified`;
    /// an unknown handle is recoverable and leaves the machine where it
    /// was.
    pub fn submit_credentials(&mut self, handle: &str, password: &str) -> Result<(), LoginError> {
        if !matches!(self.state, LoginState::AwaitingCredentials) {
            return Err(LoginError::InvalidState);
        }
        if password.is_empty() {
            return Err(LoginError::MissingPassword);
        }

        let identity = self
            .store
            .find_identity_by_handle(handle)
            .ok_or(LoginError::HandleNotFound)?;

        self.handle = Some(handle.to_string());
        self.identity_id = Some(identity.id);
        self.state = LoginState::PasswordVerified;
        Ok(())
    }

    /// Request an OTP challenge for the verified handle.
    pub async fn request_otp(&mut self, now: DateTime<Utc>) -> Result<(), LoginError> {
        if !matches!(self.state, LoginState::PasswordVerified) {
            return Err(LoginError::InvalidState);
        }
        self.dispatch_challenge(now).await
    }

    /// Whether the resend cooldown has elapsed.
    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        match self.state {
            LoginState::OtpRequested { requested_at } => {
                now - requested_at >= Duration::seconds(RESEND_COOLDOWN_SECS)
            }
            _ => false,
        }
    }

    /// Re-request the challenge once the countdown has elapsed. The old
    /// code is invalidated server-side and the countdown restarts.
    pub async fn resend_otp(&mut self, now: DateTime<Utc>) -> Result<(), LoginError> {
        let LoginState::OtpRequested { requested_at } = self.state else {
            return Err(LoginError::InvalidState);
        };
        if !self.can_resend(now) {
            let remaining = RESEND_COOLDOWN_SECS - (now - requested_at).num_seconds();
            return Err(LoginError::ResendNotReady(remaining.max(0)));
        }
        self.dispatch_challenge(now).await
    }

    /// Submit a 6-digit code for verification.
    ///
    /// A malformed code is rejected locally without a network call. An
    /// `InvalidOrExpired` response returns the machine to
    /// `OtpRequested` so the user can retry or resend; a verified code
    /// creates the session and authenticates.
    pub async fn submit_code(&mut self, code: &str, now: DateTime<Utc>) -> Result<(), LoginError> {
        let LoginState::OtpRequested { requested_at } = self.state else {
            return Err(LoginError::InvalidState);
        };
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(LoginError::MalformedCode);
        }

        let handle = self.handle.clone().ok_or(LoginError::InvalidState)?;
        self.state = LoginState::OtpVerifying;

        match self.challenge_api.verify_challenge(&handle, code).await {
            Ok(()) => {
                let identity_id = self.identity_id.clone().ok_or(LoginError::InvalidState)?;
                self.open_session(&identity_id, now)
            }
            Err(OtpError::InvalidOrExpired) => {
                // Keep the original countdown: a failed attempt does not
                // push the resend window out.
                self.state = LoginState::OtpRequested { requested_at };
                Err(LoginError::InvalidOrExpired)
            }
            Err(err) => Err(self.fail(err.to_string())),
        }
    }

    /// Federated sign-in: bypasses the OTP path entirely.
    ///
    /// First-ever sign-in provisions an identity with `registered`
    /// unset. Any OTP challenge left open for the account's email is
    /// invalidated, since the user has proven themselves through
    /// another path.
    pub fn sign_in_federated(
        &mut self,
        profile: &FederatedProfile,
        now: DateTime<Utc>,
    ) -> Result<(), LoginError> {
        if !matches!(self.state, LoginState::AwaitingCredentials) {
            return Err(LoginError::InvalidState);
        }

        let identity_id = match self.store.find_identity_by_handle(&profile.email) {
            Some(existing) => existing.id,
            None => match self.store.get_identity(&profile.uid) {
                Some(existing) => existing.id,
                None => {
                    let identity = Identity::from_federated(profile);
                    let id = identity.id.clone();
                    if self.store.create_identity(identity).is_err() {
                        return Err(self.fail("could not provision federated identity".into()));
                    }
                    tracing::info!(identity_id = %id, "provisioned identity from federated sign-in");
                    id
                }
            },
        };

        if self.store.remove_challenge_if(&profile.email, |_| true) {
            tracing::info!(handle = %profile.email, "invalidated open OTP challenge on federated sign-in");
        }

        self.identity_id = Some(identity_id.clone());
        self.open_session(&identity_id, now)
    }

    /// Explicit sign-out of this client's session.
    pub fn sign_out(&mut self) -> Result<(), LoginError> {
        let LoginState::Authenticated {
            identity_id,
            session_id,
            ..
        } = &self.state
        else {
            return Err(LoginError::InvalidState);
        };

        self.presence.on_disconnect(identity_id, session_id);
        self.reset();
        Ok(())
    }

    async fn dispatch_challenge(&mut self, now: DateTime<Utc>) -> Result<(), LoginError> {
        let handle = self.handle.clone().ok_or(LoginError::InvalidState)?;

        match self.challenge_api.request_challenge(&handle).await {
            Ok(()) => {
                self.state = LoginState::OtpRequested { requested_at: now };
                Ok(())
            }
            Err(OtpError::UnknownHandle) => {
                // The identity vanished between lookup and request.
                self.fail("Email or Phone not found".into());
                Err(LoginError::HandleNotFound)
            }
            Err(err) => Err(self.fail(err.to_string())),
        }
    }

    /// Create the session: id, presence registration, session token.
    fn open_session(&mut self, identity_id: &str, now: DateTime<Utc>) -> Result<(), LoginError> {
        let session_id = SessionId::generate(now);
        self.presence.on_connect(identity_id, session_id.clone());

        let token = match create_session_jwt(identity_id, &session_id, &self.jwt_signing_key) {
            Ok(token) => token,
            Err(err) => {
                // Roll the session back; an unauthenticated client must
                // not count towards presence.
                self.presence.on_disconnect(identity_id, &session_id);
                return Err(self.fail(format!("session token creation failed: {err}")));
            }
        };

        self.state = LoginState::Authenticated {
            identity_id: identity_id.to_string(),
            session_id,
            token,
        };
        Ok(())
    }

    fn fail(&mut self, reason: String) -> LoginError {
        tracing::warn!(reason = %reason, "login flow failed");
        self.state = LoginState::Failed {
            reason: reason.clone(),
        };
        LoginError::NetworkFailure(reason)
    }
}
