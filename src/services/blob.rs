// SPDX-License-Identifier: MIT

//! Profile-image blob storage client.
//!
//! External collaborator: uploads bytes, returns the public URL that is
//! written back onto the identity.

/// Blob storage errors.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob upload request failed: {0}")]
    Request(String),

    #[error("blob store returned status {0}")]
    Status(u16),
}

/// Client for the profile-image blob store.
#[derive(Clone)]
pub struct BlobClient {
    transport: BlobTransport,
}

#[derive(Clone)]
enum BlobTransport {
    Http {
        http: reqwest::Client,
        base_url: String,
    },
    Mock,
}

impl BlobClient {
    pub fn new(base_url: String) -> Self {
        Self {
            transport: BlobTransport::Http {
                http: reqwest::Client::new(),
                base_url,
            },
        }
    }

    /// Offline client that fabricates stable URLs without any I/O.
    pub fn new_mock() -> Self {
        Self {
            transport: BlobTransport::Mock,
        }
    }

    /// Upload a profile image and return its public URL.
    pub async fn upload_profile_image(
        &self,
        identity_id: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BlobError> {
        match &self.transport {
            BlobTransport::Http { http, base_url } => {
                let url = format!("{base_url}/profile-images/{identity_id}");
                let response = http
                    .put(&url)
                    .header("content-type", "application/octet-stream")
                    .body(bytes)
                    .send()
                    .await
                    .map_err(|e| BlobError::Request(e.to_string()))?;

                if !response.status().is_success() {
                    return Err(BlobError::Status(response.status().as_u16()));
                }
                Ok(url)
            }
            BlobTransport::Mock => Ok(format!(
                "https://storage.example.com/profile-images/{identity_id}"
            )),
        }
    }
}
