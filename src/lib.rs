// SPDX-License-Identifier: MIT

//! Teamdir: authentication backend for the team directory app.
//!
//! This crate provides the OTP challenge service, session presence
//! tracking, and the client-side login and registration flows that sit
//! on top of the shared auth store.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use config::Config;
use services::{Mailer, OtpService, PresenceTracker};
use store::AuthStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: AuthStore,
    pub otp_service: OtpService,
    pub presence: PresenceTracker,
}

impl AppState {
    /// Wire up the full service graph from a config and store.
    pub fn new(config: Config, store: AuthStore, mailer: Mailer) -> Self {
        let otp_service = OtpService::new(
            store.clone(),
            mailer,
            chrono::Duration::seconds(config.otp_ttl_secs as i64),
        );
        let presence = PresenceTracker::new(store.clone());

        Self {
            config,
            store,
            otp_service,
            presence,
        }
    }
}
