// SPDX-License-Identifier: MIT

//! Outbound transactional email.
//!
//! Production sends through an HTTP mail API; tests use the mock
//! transport, which captures the outbox and can inject failures so the
//! challenge-rollback path is exercisable offline.

use crate::config::Config;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail API request failed: {0}")]
    Request(String),

    #[error("mail API returned status {0}")]
    Status(u16),

    #[error("injected delivery failure")]
    Injected,
}

/// A message handed to the outbound channel.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Outbound email sender.
#[derive(Clone)]
pub struct Mailer {
    transport: Transport,
}

#[derive(Clone)]
enum Transport {
    Http {
        http: reqwest::Client,
        api_url: String,
        api_key: String,
        from: String,
    },
    Mock(Arc<MockState>),
}

struct MockState {
    outbox: Mutex<Vec<OutboundEmail>>,
    fail_next: AtomicBool,
}

impl Mailer {
    /// Create a mailer backed by the configured HTTP mail API.
    pub fn new(config: &Config) -> Self {
        Self {
            transport: Transport::Http {
                http: reqwest::Client::new(),
                api_url: config.mail_api_url.clone(),
                api_key: config.mail_api_key.clone(),
                from: config.mail_from.clone(),
            },
        }
    }

    /// Create an offline mailer that captures sent messages.
    pub fn new_mock() -> Self {
        Self {
            transport: Transport::Mock(Arc::new(MockState {
                outbox: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            })),
        }
    }

    /// Send one message.
    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), MailError> {
        match &self.transport {
            Transport::Http {
                http,
                api_url,
                api_key,
                from,
            } => {
                let body = serde_json::json!({
                    "from": from,
                    "to": to,
                    "subject": subject,
                    "text": text,
                });

                let response = http
                    .post(api_url)
                    .bearer_auth(api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| MailError::Request(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(MailError::Status(response.status().as_u16()));
                }
                Ok(())
            }
            Transport::Mock(state) => {
                if state.fail_next.swap(false, Ordering::SeqCst) {
                    return Err(MailError::Injected);
                }
                state.outbox.lock().expect("outbox poisoned").push(OutboundEmail {
                    to: to.to_string(),
                    subject: subject.to_string(),
                    text: text.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Send an OTP code to a user.
    pub async fn send_otp_email(&self, to: &str, code: &str) -> Result<(), MailError> {
        self.send(to, "Your OTP Code", &format!("Your OTP code is {code}"))
            .await
    }

    /// Messages captured by the mock transport (empty for HTTP).
    pub fn sent_mail(&self) -> Vec<OutboundEmail> {
        match &self.transport {
            Transport::Mock(state) => state.outbox.lock().expect("outbox poisoned").clone(),
            Transport::Http { .. } => Vec::new(),
        }
    }

    /// Make the next mock send fail. No-op for the HTTP transport.
    pub fn fail_next_send(&self) {
        if let Transport::Mock(state) = &self.transport {
            state.fail_next.store(true, Ordering::SeqCst);
        }
    }
}
