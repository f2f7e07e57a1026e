//! Error types for the Goal Pyramid API client.
//!
//! # Design
//! A 404 is not an error here: the pipeline reports it as
//! [`Outcome::NotFound`](crate::Outcome::NotFound). Every other failure lands in
//! one `ApiError` variant. `Rejected` displays as the server's message alone so
//! callers can show it to the user unchanged.

use thiserror::Error;

/// Message used when a rejected response carries no readable `error` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Errors returned by the request pipeline and the clients built on it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication was required but no id token was available. No request
    /// was sent.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The server answered with a non-2xx status other than 404.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    Transport(String),

    /// A 2xx response body could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status of a rejected response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while loading [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),
}
