// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod blob;
pub mod mailer;
pub mod otp;
pub mod presence;

pub use blob::BlobClient;
pub use mailer::{MailError, Mailer, OutboundEmail};
pub use otp::{ChallengeApi, OtpError, OtpService};
pub use presence::PresenceTracker;
