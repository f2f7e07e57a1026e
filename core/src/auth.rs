//! The authentication seam.
//!
//! The pipeline never owns credentials. It asks an [`AuthProvider`] for the
//! current id token on every call, so a token refreshed between calls is
//! picked up without rebuilding the client.

use std::sync::RwLock;

use tracing::info;

use crate::utils::is_token_valid;

/// Tokens held by the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub id_token: Option<String>,
}

/// Source of the caller's identity.
pub trait AuthProvider: Send + Sync {
    fn tokens(&self) -> Tokens;

    fn is_authenticated(&self) -> bool;

    /// End the session. Navigation after logout is the page's business.
    fn logout(&self);
}

/// In-memory session holding at most one id token.
#[derive(Debug, Default)]
pub struct SessionAuth {
    id_token: RwLock<Option<String>>,
}

impl SessionAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(id_token: impl Into<String>) -> Self {
        Self {
            id_token: RwLock::new(Some(id_token.into())),
        }
    }

    pub fn sign_in(&self, id_token: impl Into<String>) {
        *self.id_token.write().unwrap_or_else(|e| e.into_inner()) = Some(id_token.into());
    }
}

impl AuthProvider for SessionAuth {
    fn tokens(&self) -> Tokens {
        let id_token = self
            .id_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        Tokens { id_token }
    }

    fn is_authenticated(&self) -> bool {
        self.tokens()
            .id_token
            .as_deref()
            .is_some_and(is_token_valid)
    }

    fn logout(&self) {
        self.id_token
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        info!("session cleared");
    }
}
