//! Home page: greet the signed-in user or redirect to login or onboarding.

use tracing::warn;

use crate::auth::AuthProvider;
use crate::client::Outcome;
use crate::profile::ProfileClient;
use crate::utils::{require_auth, DEFAULT_LOGIN_PAGE};

pub const ONBOARDING_PAGE: &str = "onboarding.html";

/// Name shown when the profile could not be loaded.
pub const FALLBACK_GREETING: &str = "there";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeView {
    /// Navigate away instead of rendering.
    Redirect(String),
    /// Greet the user by this name.
    Greeting(String),
}

/// Decide what the home page shows for the current session.
pub async fn load_home(auth: &dyn AuthProvider, profiles: &ProfileClient) -> HomeView {
    if let Some(login_page) = require_auth(auth, DEFAULT_LOGIN_PAGE) {
        return HomeView::Redirect(login_page);
    }

    match profiles.get_profile(None).await {
        Ok(Outcome::Found(profile)) => HomeView::Greeting(profile.display_name),
        Ok(Outcome::NotFound) => HomeView::Redirect(ONBOARDING_PAGE.to_string()),
        Err(err) => {
            warn!(error = %err, "failed to load profile for home page");
            HomeView::Greeting(FALLBACK_GREETING.to_string())
        }
    }
}
