//! Client core for the Goal Pyramid web application.
//!
//! # Overview
//! An authenticated JSON request pipeline ([`ApiClient`]), a profile client
//! built on it, the page-load logic for the home page and navbar, profile
//! validators matching the backend's rules, and small JWT/HTML/URL helpers.
//!
//! # Design
//! - No globals: configuration, the auth provider and the transport are
//!   injected into `ApiClient::new`.
//! - Each call is split into `build_request` (pure), one transport round-trip,
//!   and `parse_response` (pure), so the I/O boundary is explicit.
//! - A 404 is `Outcome::NotFound`, not an error; everything else that goes
//!   wrong is an [`ApiError`], logged once where it is detected.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pages;
pub mod profile;
pub mod types;
pub mod utils;
pub mod validators;

pub use auth::{AuthProvider, SessionAuth, Tokens};
pub use client::{build_query_params, parse_response, ApiClient, Outcome, QueryParams, RequestOptions};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use profile::ProfileClient;
pub use types::{CreateProfile, Profile, UpdateProfile};
pub use validators::ValidationError;
