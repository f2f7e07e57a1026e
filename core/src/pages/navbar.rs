//! Navbar user info and the logout button.

use tracing::warn;

use crate::auth::AuthProvider;
use crate::client::Outcome;
use crate::profile::ProfileClient;

/// Name shown when the profile could not be loaded.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavbarUser {
    DisplayName(String),
    /// Leave whatever the navbar markup already shows.
    Unchanged,
}

pub async fn load_navbar_user(profiles: &ProfileClient) -> NavbarUser {
    match profiles.get_profile(None).await {
        Ok(Outcome::Found(profile)) => NavbarUser::DisplayName(profile.display_name),
        Ok(Outcome::NotFound) => NavbarUser::Unchanged,
        Err(err) => {
            warn!(error = %err, "failed to load navbar user info");
            NavbarUser::DisplayName(FALLBACK_DISPLAY_NAME.to_string())
        }
    }
}

/// Log out if the user confirmed. Returns whether the session was ended.
pub fn handle_logout(auth: &dyn AuthProvider, confirmed: bool) -> bool {
    if confirmed {
        auth.logout();
    }
    confirmed
}
