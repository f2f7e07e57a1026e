//! In-memory stand-in for the Goal Pyramid `/profile` API.
//!
//! The caller is identified by the `sub` claim of the raw JWT in the
//! `Authorization` header; signatures are not checked. Error bodies are
//! `{"error": "..."}` objects, matching the real backend.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use pyramid_core::utils::decode_jwt_token;
use pyramid_core::validators::{validate_profile_data, validate_profile_update, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub bio: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unauthorized - Invalid token")]
    Unauthorized,

    #[error("Resource not found")]
    NotFound,

    #[error("Profile already exists")]
    AlreadyExists,

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The body or query string could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match self {
            ServerError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::AlreadyExists | ServerError::Invalid(_) | ServerError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        };
        debug!(status = status.as_u16(), error = %self, "request rejected");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type Db = Arc<RwLock<HashMap<String, Profile>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(
            "/profile",
            get(get_profile).post(create_profile).put(update_profile),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock server listening");
    }
    axum::serve(listener, app()).await
}

/// User id of the caller, taken from the token's `sub` claim.
fn caller_id(headers: &HeaderMap) -> Result<String, ServerError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    // The header carries the bare token; a scheme prefix is not accepted.
    if token.contains(char::is_whitespace) {
        return Err(ServerError::Unauthorized);
    }
    decode_jwt_token(token)
        .as_ref()
        .and_then(|claims| claims.get("sub"))
        .and_then(|sub| sub.as_str())
        .filter(|sub| !sub.is_empty())
        .map(str::to_owned)
        .ok_or(ServerError::Unauthorized)
}

async fn get_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> Result<Json<Profile>, ServerError> {
    let caller = caller_id(&headers)?;
    let Query(query) = query?;
    let user_id = query.user_id.unwrap_or(caller);
    let profiles = db.read().await;
    profiles
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or(ServerError::NotFound)
}

async fn create_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    input: Result<Json<CreateProfile>, JsonRejection>,
) -> Result<(StatusCode, Json<Profile>), ServerError> {
    let caller = caller_id(&headers)?;
    let Json(input) = input?;
    validate_profile_data(input.display_name.as_deref(), input.bio.as_deref())?;

    let mut profiles = db.write().await;
    if profiles.contains_key(&caller) {
        return Err(ServerError::AlreadyExists);
    }
    let profile = Profile {
        user_id: caller.clone(),
        display_name: input.display_name.unwrap_or_default().trim().to_owned(),
        bio: input.bio,
    };
    profiles.insert(caller, profile.clone());
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    input: Result<Json<UpdateProfile>, JsonRejection>,
) -> Result<Json<Profile>, ServerError> {
    let caller = caller_id(&headers)?;
    let Json(input) = input?;
    validate_profile_update(input.display_name.as_deref(), input.bio.as_deref())?;

    let mut profiles = db.write().await;
    let profile = profiles.get_mut(&caller).ok_or(ServerError::NotFound)?;
    if let Some(display_name) = input.display_name.filter(|name| !name.is_empty()) {
        profile.display_name = display_name.trim().to_owned();
    }
    if let Some(bio) = input.bio {
        profile.bio = Some(bio);
    }
    Ok(Json(profile.clone()))
}
