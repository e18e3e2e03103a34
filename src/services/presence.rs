// SPDX-License-Identifier: MIT

//! Session presence tracking.
//!
//! Maintains the per-identity set of live sessions and the derived
//! `isActive` flag. The flag is advisory (a dashboard badge): it must
//! converge to `live sessions > 0` under any interleaving of events,
//! and it is never an authorization input.

use crate::models::SessionId;
use crate::store::AuthStore;

/// Tracks live sessions per identity.
#[derive(Clone)]
pub struct PresenceTracker {
    store: AuthStore,
}

impl PresenceTracker {
    pub fn new(store: AuthStore) -> Self {
        Self { store }
    }

    /// Register a new live session. Returns the live count afterwards.
    pub fn on_connect(&self, identity_id: &str, session_id: SessionId) -> usize {
        let live = self.store.add_session(identity_id, session_id.clone());
        tracing::info!(identity_id, session_id = %session_id, live, "session connected");
        live
    }

    /// Explicit sign-out of one session. Idempotent; returns the live
    /// count afterwards.
    pub fn on_disconnect(&self, identity_id: &str, session_id: &SessionId) -> usize {
        let live = self.store.remove_session(identity_id, session_id);
        tracing::info!(identity_id, session_id = %session_id, live, "session disconnected");
        live
    }

    /// Transport-level disconnect (tab closed without clean sign-out).
    ///
    /// Best-effort cleanup: presence is advisory, so this logs and
    /// continues rather than surfacing an error.
    pub fn on_lost_connection(&self, identity_id: &str, session_id: &SessionId) {
        let live = self.store.remove_session(identity_id, session_id);
        tracing::warn!(
            identity_id,
            session_id = %session_id,
            live,
            "session lost without clean sign-out"
        );
    }

    /// Current derived active flag for an identity.
    pub fn is_active(&self, identity_id: &str) -> bool {
        self.store
            .get_identity(identity_id)
            .map(|identity| identity.is_active)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    fn tracker_with_identity(id: &str) -> PresenceTracker {
        let store = AuthStore::new();
        store
            .create_identity(Identity {
                id: id.to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: format!("{id}@gmail.com"),
                phone: String::new(),
                job_title: String::new(),
                register_date: "2026-08-01T10:00:00Z".to_string(),
                is_active: false,
                image_url: String::new(),
                registered: true,
            })
            .unwrap();
        PresenceTracker::new(store)
    }

    fn sid(raw: &str) -> SessionId {
        SessionId::from(raw.to_string())
    }

    #[test]
    fn test_two_tabs_scenario() {
        let tracker = tracker_with_identity("u1");
        let (s1, s2) = (sid("s1"), sid("s2"));

        tracker.on_connect("u1", s1.clone());
        tracker.on_connect("u1", s2.clone());
        assert!(tracker.is_active("u1"));

        tracker.on_disconnect("u1", &s1);
        assert!(tracker.is_active("u1"), "second tab keeps identity active");

        tracker.on_disconnect("u1", &s2);
        assert!(!tracker.is_active("u1"));
    }

    #[test]
    fn test_double_disconnect_is_idempotent() {
        let tracker = tracker_with_identity("u1");
        let (s1, s2) = (sid("s1"), sid("s2"));

        tracker.on_connect("u1", s1.clone());
        tracker.on_connect("u1", s2);

        assert_eq!(tracker.on_disconnect("u1", &s1), 1);
        assert_eq!(tracker.on_disconnect("u1", &s1), 1);
        assert!(tracker.is_active("u1"));
    }

    #[test]
    fn test_lost_connection_cleans_up() {
        let tracker = tracker_with_identity("u1");
        let s1 = sid("s1");

        tracker.on_connect("u1", s1.clone());
        tracker.on_lost_connection("u1", &s1);
        assert!(!tracker.is_active("u1"));

        // Losing a connection that never registered is harmless.
        tracker.on_lost_connection("u1", &sid("ghost"));
        assert!(!tracker.is_active("u1"));
    }

    #[test]
    fn test_event_order_independence() {
        // Every serialization of {connect A, connect B, disconnect A}
        // consistent with causal order (connect A before disconnect A)
        // must end with B live and the identity active.
        let orders: &[&[&str]] = &[
            &["+A", "+B", "-A"],
            &["+A", "-A", "+B"],
            &["+B", "+A", "-A"],
        ];

        for order in orders {
            let tracker = tracker_with_identity("u1");
            for step in *order {
                match *step {
                    "+A" => {
                        tracker.on_connect("u1", sid("A"));
                    }
                    "+B" => {
                        tracker.on_connect("u1", sid("B"));
                    }
                    "-A" => {
                        tracker.on_disconnect("u1", &sid("A"));
                    }
                    _ => unreachable!(),
                }
            }
            assert!(tracker.is_active("u1"), "order {order:?} lost session B");

            tracker.on_disconnect("u1", &sid("B"));
            assert!(!tracker.is_active("u1"), "order {order:?} left a phantom");
        }
    }

    #[test]
    fn test_unknown_identity_is_inactive() {
        let tracker = tracker_with_identity("u1");
        assert!(!tracker.is_active("missing"));
    }
}
