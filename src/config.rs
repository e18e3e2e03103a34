// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Transactional mail API endpoint
    pub mail_api_url: String,
    /// Transactional mail API key
    pub mail_api_key: String,
    /// From address for outbound OTP mail
    pub mail_from: String,
    /// Profile-image blob store base URL
    pub blob_base_url: String,
    /// Server-enforced OTP lifetime in seconds
    pub otp_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Secrets come from the environment in all deployments; a `.env`
    /// file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            mail_api_url: env::var("MAIL_API_URL")
                .unwrap_or_else(|_| "https://api.mailchannel.example/v1/send".to_string()),
            mail_api_key: env::var("MAIL_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MAIL_API_KEY"))?,
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "no-reply@teamdir.example".to_string()),
            blob_base_url: env::var("BLOB_BASE_URL")
                .unwrap_or_else(|_| "https://storage.example.com".to_string()),
            otp_ttl_secs: env::var("OTP_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap_or(300),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            port: 5000,
            frontend_url: "http://localhost:3000".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            mail_api_url: "http://localhost:0/send".to_string(),
            mail_api_key: "test_mail_key".to_string(),
            mail_from: "no-reply@test.local".to_string(),
            blob_base_url: "https://storage.example.com".to_string(),
            otp_ttl_secs: 300,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!!");
        env::set_var("MAIL_API_KEY", "test_mail_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 5000);
        assert_eq!(config.mail_api_key, "test_mail_key");
        assert_eq!(config.otp_ttl_secs, 300);
    }
}
