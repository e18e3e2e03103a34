// SPDX-License-Identifier: MIT

//! Data model for identities, sessions, and OTP challenges.

pub mod challenge;
pub mod identity;
pub mod session;

pub use challenge::OtpChallenge;
pub use identity::{FederatedProfile, Identity};
pub use session::SessionId;
