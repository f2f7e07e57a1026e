//! Profile DTOs for the `/profile` resource.
//!
//! # Design
//! These mirror the mock server's schema but are defined independently;
//! integration tests catch drift between the two crates. Decoding into these
//! structs is where a response body is checked against the expected shape.

use serde::{Deserialize, Serialize};

use crate::validators::{validate_profile_data, validate_profile_update, ValidationError};

/// A user's public profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request payload for creating the caller's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateProfile {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl CreateProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_profile_data(Some(&self.display_name), self.bio.as_deref())
    }
}

/// Request payload for updating the caller's profile. Only the fields present
/// in the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UpdateProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_profile_update(self.display_name.as_deref(), self.bio.as_deref())
    }
}
