// SPDX-License-Identifier: MIT

//! Session identifiers.

use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for one live authenticated connection (device/tab).
///
/// A wall-clock timestamp alone can collide when two tabs sign in within
/// the same millisecond, so the id carries a CSPRNG suffix as well.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh session id: creation time in millis plus a
    /// random 32-bit suffix, both hex.
    pub fn generate(now: chrono::DateTime<chrono::Utc>) -> Self {
        let rng = SystemRandom::new();
        let mut suffix = [0u8; 4];
        // SystemRandom failure means the OS entropy source is broken;
        // there is no session to create in that case.
        rng.fill(&mut suffix)
            .expect("system random source unavailable");

        Self(format!(
            "{:x}-{:08x}",
            now.timestamp_millis(),
            u32::from_be_bytes(suffix)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
