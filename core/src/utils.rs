//! Small helpers shared by the pages and the auth layer: JWT payload
//! inspection, HTML escaping and URL query lookup.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::auth::AuthProvider;

/// Page unauthenticated visitors are sent to.
pub const DEFAULT_LOGIN_PAGE: &str = "index.html";

/// Decode the payload segment of a JWT without verifying its signature.
///
/// Returns `None` for an empty token, a token without a payload segment, or a
/// payload that is not base64url-encoded JSON.
pub fn decode_jwt_token(token: &str) -> Option<Value> {
    if token.is_empty() {
        return None;
    }
    let Some(segment) = token.split('.').nth(1) else {
        warn!("failed to decode JWT: missing payload segment");
        return None;
    };
    let bytes = match URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(error = %error, "failed to decode JWT payload");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(payload) => Some(payload),
        Err(error) => {
            warn!(error = %error, "failed to parse JWT payload");
            None
        }
    }
}

/// True when the token carries a numeric `exp` claim that lies after `now`.
pub fn is_token_valid_at(token: &str, now: SystemTime) -> bool {
    let Some(exp) = decode_jwt_token(token)
        .as_ref()
        .and_then(|payload| payload.get("exp"))
        .and_then(Value::as_f64)
    else {
        return false;
    };
    let now_secs = now
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);
    now_secs < exp
}

pub fn is_token_valid(token: &str) -> bool {
    is_token_valid_at(token, SystemTime::now())
}

/// Where to send the visitor if they are not signed in, or `None` to stay.
pub fn require_auth(auth: &dyn AuthProvider, login_page: &str) -> Option<String> {
    if auth.is_authenticated() {
        None
    } else {
        Some(login_page.to_owned())
    }
}

/// Escape text for insertion into HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// First decoded value of query parameter `name` in `url`.
pub fn get_url_param(url: &str, name: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
