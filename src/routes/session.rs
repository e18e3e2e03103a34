// SPDX-License-Identifier: MIT

//! Session routes (protected by the session token middleware).

use axum::{extract::State, routing::post, Extension, Json, Router};
use std::sync::Arc;

use crate::middleware::auth::AuthUser;
use crate::routes::MessageResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/sign-out", post(sign_out))
}

/// Remove the caller's session.
///
/// Presence cleanup is advisory, so this always reports success; the
/// remove itself is idempotent.
async fn sign_out(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<MessageResponse> {
    state
        .presence
        .on_disconnect(&user.identity_id, &user.session_id);
    MessageResponse::new("Signed out")
}
