// SPDX-License-Identifier: MIT

//! Client-side flows: the login state machine and the registration
//! confirmation poller. These run one instance per client (device/tab)
//! and talk to the challenge service and the shared store.

pub mod login;
pub mod otp_client;
pub mod signup;

pub use login::{LoginError, LoginFlow, LoginState};
pub use otp_client::OtpClient;
pub use signup::{PollOutcome, RegistrationFlow, RegistrationOutcome, RegistrationRequest};
