//! Client for the `/profile` resource.

use tracing::warn;

use crate::client::{build_query_params, ApiClient, Outcome};
use crate::error::ApiError;
use crate::types::{CreateProfile, Profile, UpdateProfile};

pub const PROFILE_ENDPOINT: &str = "/profile";

#[derive(Debug, Clone)]
pub struct ProfileClient {
    api: ApiClient,
}

impl ProfileClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The caller's own profile, or another user's when `user_id` is given.
    pub async fn get_profile(&self, user_id: Option<&str>) -> Result<Outcome<Profile>, ApiError> {
        let query = build_query_params([("user_id", user_id)]);
        self.api.get(PROFILE_ENDPOINT, query).await
    }

    pub async fn create_profile(&self, input: &CreateProfile) -> Result<Outcome<Profile>, ApiError> {
        self.api.post(PROFILE_ENDPOINT, input).await
    }

    pub async fn update_profile(&self, input: &UpdateProfile) -> Result<Outcome<Profile>, ApiError> {
        self.api.put(PROFILE_ENDPOINT, input).await
    }

    /// Whether the caller has created a profile yet. Errors count as "no".
    pub async fn has_profile(&self) -> bool {
        match self.get_profile(None).await {
            Ok(outcome) => outcome.is_found(),
            Err(err) => {
                warn!(error = %err, "profile check failed");
                false
            }
        }
    }
}
