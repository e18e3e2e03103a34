// SPDX-License-Identifier: MIT

//! Shared auth store: the system of record for ephemeral authentication
//! state (identities, OTP challenges, live session sets).

pub mod memory;

pub use memory::{AuthStore, StoreError};

use crate::models::SessionId;

/// Change events broadcast by the store.
///
/// Session events carry the live count observed inside the critical
/// section that performed the mutation, so subscribers never see a count
/// inconsistent with the event ordering.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    SessionAdded {
        identity_id: String,
        session_id: SessionId,
        live_count: usize,
    },
    SessionRemoved {
        identity_id: String,
        session_id: SessionId,
        live_count: usize,
    },
    ActiveChanged {
        identity_id: String,
        active: bool,
    },
    IdentityDeleted {
        identity_id: String,
    },
}
