// SPDX-License-Identifier: MIT

use std::sync::Arc;
use teamdir::config::Config;
use teamdir::models::Identity;
use teamdir::routes::create_router;
use teamdir::services::Mailer;
use teamdir::store::AuthStore;
use teamdir::AppState;

/// Create a test app with offline mock dependencies.
/// Returns the router, the shared state, and the mock mailer.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Mailer) {
    let config = Config::test_default();
    let store = AuthStore::new();
    let mailer = Mailer::new_mock();

    let state = Arc::new(AppState::new(config, store, mailer.clone()));
    (create_router(state.clone()), state, mailer)
}

/// Seed a registered identity into the store.
#[allow(dead_code)]
pub fn seed_identity(store: &AuthStore, id: &str, email: &str, phone: &str) {
    store
        .create_identity(Identity {
            id: id.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            job_title: "Developer".to_string(),
            register_date: "2026-08-01T10:00:00Z".to_string(),
            is_active: false,
            image_url: String::new(),
            registered: true,
        })
        .expect("seed identity");
}
