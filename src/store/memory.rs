// SPDX-License-Identifier: MIT

//! Embedded key-value store backing the auth subsystem.
//!
//! Each map is keyed so that one dashmap entry covers one unit of
//! mutual exclusion: a challenge per handle, a session set per identity.
//! Read-modify-write of a session set happens entirely under the entry
//! guard, and the derived `isActive` flag is republished before the
//! guard is released. Lock order is always sessions → identities.

use crate::models::{Identity, OtpChallenge, SessionId};
use crate::store::StoreEvent;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::broadcast;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Store-level errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("handle already registered")]
    DuplicateHandle,
}

/// Shared auth store handle. Cheap to clone.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<Inner>,
}

struct Inner {
    /// Identities keyed by opaque id
    identities: DashMap<String, Identity>,
    /// Login handle (email or phone) → identity id
    handle_index: DashMap<String, String>,
    /// Live OTP challenge per handle (at most one)
    challenges: DashMap<String, OtpChallenge>,
    /// Live session ids per identity
    sessions: DashMap<String, BTreeSet<SessionId>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                identities: DashMap::new(),
                handle_index: DashMap::new(),
                challenges: DashMap::new(),
                sessions: DashMap::new(),
                events,
            }),
        }
    }

    /// Subscribe to the store's change feed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    // ─── Identity Operations ─────────────────────────────────────

    pub fn get_identity(&self, id: &str) -> Option<Identity> {
        self.inner.identities.get(id).map(|i| i.clone())
    }

    /// Look up an identity by login handle via the handle index.
    pub fn find_identity_by_handle(&self, handle: &str) -> Option<Identity> {
        let id = self.inner.handle_index.get(handle)?.clone();
        self.get_identity(&id)
    }

    /// Whether any identity already owns one of the given handles.
    pub fn handle_in_use(&self, handles: &[&str]) -> bool {
        handles
            .iter()
            .filter(|h| !h.is_empty())
            .any(|h| self.inner.handle_index.contains_key(*h))
    }

    /// Create an identity, claiming its handles atomically.
    ///
    /// If another identity already owns the email or phone, nothing is
    /// written and `DuplicateHandle` is returned (any handle claimed
    /// before the conflict is released again).
    pub fn create_identity(&self, identity: Identity) -> Result<(), StoreError> {
        let mut claimed: Vec<String> = Vec::new();
        let mut conflict = false;

        for handle in [identity.email.as_str(), identity.phone.as_str()] {
            if handle.is_empty() {
                continue;
            }
            match self.inner.handle_index.entry(handle.to_string()) {
                Entry::Occupied(existing) => {
                    // A re-write of the same identity keeps its own handles.
                    if existing.get() != &identity.id {
                        conflict = true;
                        break;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(identity.id.clone());
                    claimed.push(handle.to_string());
                }
            }
        }

        // Rollback must wait until the conflicting entry's guard is
        // dropped: a claimed handle can share a shard with the conflict,
        // and removing it under that guard deadlocks.
        if conflict {
            for h in claimed {
                self.inner.handle_index.remove(&h);
            }
            return Err(StoreError::DuplicateHandle);
        }

        self.inner.identities.insert(identity.id.clone(), identity);
        Ok(())
    }

    /// Delete an identity and cascade to its handles, challenges, and
    /// session set.
    pub fn delete_identity(&self, id: &str) {
        let Some((_, identity)) = self.inner.identities.remove(id) else {
            return;
        };

        for handle in [identity.email.as_str(), identity.phone.as_str()] {
            if !handle.is_empty() {
                self.inner.handle_index.remove(handle);
                self.inner.challenges.remove(handle);
            }
        }
        self.inner.sessions.remove(id);

        let _ = self.inner.events.send(StoreEvent::IdentityDeleted {
            identity_id: id.to_string(),
        });
    }

    /// Count fully registered identities. Federation-provisioned
    /// identities (`registered == false`) are excluded.
    pub fn count_registered(&self) -> usize {
        self.inner
            .identities
            .iter()
            .filter(|entry| entry.registered)
            .count()
    }

    // ─── Challenge Operations ────────────────────────────────────

    /// Store a challenge, overwriting any prior one for the handle.
    pub fn put_challenge(&self, challenge: OtpChallenge) {
        self.inner
            .challenges
            .insert(challenge.handle.clone(), challenge);
    }

    pub fn get_challenge(&self, handle: &str) -> Option<OtpChallenge> {
        self.inner.challenges.get(handle).map(|c| c.clone())
    }

    /// Atomically remove the challenge for `handle` if the predicate
    /// holds. This is the single compare-and-consume step behind both
    /// verification and delivery-failure rollback; there is no window
    /// between the comparison and the removal.
    pub fn remove_challenge_if<F>(&self, handle: &str, pred: F) -> bool
    where
        F: FnOnce(&OtpChallenge) -> bool,
    {
        self.inner
            .challenges
            .remove_if(handle, |_, challenge| pred(challenge))
            .is_some()
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Register a live session; returns the live count afterwards.
    pub fn add_session(&self, identity_id: &str, session_id: SessionId) -> usize {
        let mut set = self
            .inner
            .sessions
            .entry(identity_id.to_string())
            .or_default();
        let inserted = set.insert(session_id.clone());
        let live = set.len();

        if inserted {
            let _ = self.inner.events.send(StoreEvent::SessionAdded {
                identity_id: identity_id.to_string(),
                session_id,
                live_count: live,
            });
        }
        // Republish while still holding the set's entry guard.
        self.publish_active(identity_id, live);
        live
    }

    /// Remove a session; idempotent. Returns the live count afterwards.
    pub fn remove_session(&self, identity_id: &str, session_id: &SessionId) -> usize {
        match self.inner.sessions.get_mut(identity_id) {
            Some(mut set) => {
                let removed = set.remove(session_id);
                let live = set.len();

                if removed {
                    let _ = self.inner.events.send(StoreEvent::SessionRemoved {
                        identity_id: identity_id.to_string(),
                        session_id: session_id.clone(),
                        live_count: live,
                    });
                }
                self.publish_active(identity_id, live);
                live
            }
            None => {
                self.publish_active(identity_id, 0);
                0
            }
        }
    }

    /// Remove every session for an identity (account sign-out-all or
    /// deletion cleanup). Returns how many were removed.
    pub fn clear_sessions(&self, identity_id: &str) -> usize {
        match self.inner.sessions.get_mut(identity_id) {
            Some(mut set) => {
                let removed = set.len();
                set.clear();
                self.publish_active(identity_id, 0);
                removed
            }
            None => 0,
        }
    }

    pub fn session_count(&self, identity_id: &str) -> usize {
        self.inner
            .sessions
            .get(identity_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Recompute and store the derived active flag from a live count
    /// observed under the session entry guard.
    fn publish_active(&self, identity_id: &str, live: usize) {
        let active = live > 0;
        if let Some(mut identity) = self.inner.identities.get_mut(identity_id) {
            if identity.is_active != active {
                identity.is_active = active;
                let _ = self.inner.events.send(StoreEvent::ActiveChanged {
                    identity_id: identity_id.to_string(),
                    active,
                });
            }
        }
    }
}
