//! The user profile record and its request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote service, immutable once assigned
pub type ProfileId = i64;

/// A user profile record as returned by the remote service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The record identifier
    pub id: ProfileId,

    /// Display name
    pub name: String,

    /// Contact address, unique remotely
    pub email: String,

    /// Optional free-text biography
    pub bio: Option<String>,

    /// Set by the service on creation
    pub created_at: DateTime<Utc>,

    /// Refreshed by the service on every update
    pub updated_at: DateTime<Utc>,
}

/// The mutable fields of a profile, submitted on create and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl ProfileDraft {
    /// Create a new draft with the required fields
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            bio: None,
        }
    }

    /// Set the biography
    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }
}
