// SPDX-License-Identifier: MIT

//! Concurrency tests for the presence tracker.
//!
//! Hammer connect/disconnect from many tasks and assert the derived
//! active flag matches the surviving session set, whatever order the
//! updates landed in.

use std::sync::Arc;

use teamdir::models::SessionId;
use teamdir::services::PresenceTracker;
use teamdir::store::AuthStore;

mod common;
use common::seed_identity;

#[tokio::test]
async fn test_concurrent_connects_all_land() {
    let store = AuthStore::new();
    seed_identity(&store, "u1", "a@gmail.com", "");
    let presence = Arc::new(PresenceTracker::new(store.clone()));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let presence = presence.clone();
        handles.push(tokio::spawn(async move {
            let sid = SessionId::generate(chrono::Utc::now());
            presence.on_connect("u1", sid.clone());
            sid
        }));
    }

    let mut sids = Vec::new();
    for handle in handles {
        sids.push(handle.await.unwrap());
    }

    assert_eq!(store.session_count("u1"), 32);
    assert!(presence.is_active("u1"));

    // Tear them all down concurrently; the flag must settle to false.
    let mut handles = Vec::new();
    for sid in sids {
        let presence = presence.clone();
        handles.push(tokio::spawn(async move {
            presence.on_disconnect("u1", &sid);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.session_count("u1"), 0);
    assert!(!presence.is_active("u1"));
}

#[tokio::test]
async fn test_concurrent_mixed_connect_disconnect() {
    let store = AuthStore::new();
    seed_identity(&store, "u1", "a@gmail.com", "");
    let presence = Arc::new(PresenceTracker::new(store.clone()));

    // One session that stays up for the whole test.
    let keeper = SessionId::generate(chrono::Utc::now());
    presence.on_connect("u1", keeper.clone());

    // Each task opens and immediately closes its own session.
    let mut handles = Vec::new();
    for _ in 0..64 {
        let presence = presence.clone();
        handles.push(tokio::spawn(async move {
            let sid = SessionId::generate(chrono::Utc::now());
            presence.on_connect("u1", sid.clone());
            tokio::task::yield_now().await;
            presence.on_disconnect("u1", &sid);
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Only the keeper survives, so the identity is still active.
    assert_eq!(store.session_count("u1"), 1);
    assert!(presence.is_active("u1"));

    presence.on_disconnect("u1", &keeper);
    assert!(!presence.is_active("u1"));
}

#[tokio::test]
async fn test_concurrent_presence_across_identities() {
    let store = AuthStore::new();
    seed_identity(&store, "u1", "a@gmail.com", "");
    seed_identity(&store, "u2", "b@gmail.com", "");
    let presence = Arc::new(PresenceTracker::new(store.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let presence = presence.clone();
        handles.push(tokio::spawn(async move {
            let id = if i % 2 == 0 { "u1" } else { "u2" };
            let sid = SessionId::generate(chrono::Utc::now());
            presence.on_connect(id, sid.clone());
            if i % 2 == 0 {
                presence.on_disconnect(id, &sid);
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // u1 tasks all disconnected; u2 tasks all stayed connected.
    assert!(!presence.is_active("u1"));
    assert!(presence.is_active("u2"));
    assert_eq!(store.session_count("u2"), 8);
}
