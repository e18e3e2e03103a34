// SPDX-License-Identifier: MIT

//! Identity (user profile) model.

use serde::{Deserialize, Serialize};

/// A user identity stored in the auth store.
///
/// Field names are camelCase on the wire to match the profile store the
/// frontend reads directly. `is_active` is a derived cache of session-set
/// emptiness maintained by the presence tracker, never ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque stable user key (document id)
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Email address, usable as a login handle
    pub email: String,
    /// Phone number, usable as a login handle (may be empty for
    /// federation-provisioned identities)
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub job_title: String,
    /// RFC3339 timestamp of when the profile write completed
    #[serde(default)]
    pub register_date: String,
    /// Derived: at least one live session exists
    #[serde(default)]
    pub is_active: bool,
    /// Profile image URL in blob storage
    #[serde(default)]
    pub image_url: String,
    /// True once profile fields are persisted. Federation-provisioned
    /// identities stay false until the user completes registration.
    #[serde(default)]
    pub registered: bool,
}

impl Identity {
    /// Provision an identity from a federated sign-in.
    ///
    /// `registered` is left false: the profile has not been written yet,
    /// which distinguishes these from fully registered users.
    pub fn from_federated(profile: &FederatedProfile) -> Self {
        Self {
            id: profile.uid.clone(),
            first_name: profile.display_name.clone(),
            last_name: String::new(),
            email: profile.email.clone(),
            phone: String::new(),
            job_title: String::new(),
            register_date: String::new(),
            is_active: false,
            image_url: profile.photo_url.clone().unwrap_or_default(),
            registered: false,
        }
    }
}

/// Profile attributes returned by the federated identity provider.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    /// Provider-assigned stable user id
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}
