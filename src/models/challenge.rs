// SPDX-License-Identifier: MIT

//! OTP challenge model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A single-use numeric code bound to a login handle.
///
/// At most one challenge exists per handle; a new request overwrites the
/// old record and with it the old code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    /// Email or phone the challenge was issued for
    pub handle: String,
    /// 6-digit numeric code
    pub code: String,
    /// Issue time; expiry is enforced server-side as `issued_at + ttl`
    pub issued_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Whether the challenge is past its server-enforced lifetime.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let issued_at = Utc::now();
        let challenge = OtpChallenge {
            handle: "a@gmail.com".to_string(),
            code: "123456".to_string(),
            issued_at,
        };

        let ttl = Duration::seconds(300);
        assert!(!challenge.is_expired(issued_at + Duration::seconds(299), ttl));
        assert!(challenge.is_expired(issued_at + Duration::seconds(301), ttl));
    }
}
