//! Page-load logic for the signed-in area.
//!
//! Each page decides for itself how to recover from a failed profile load;
//! the pipeline only reports what happened. Rendering is left to the host, so
//! these functions return what the page should show or where it should go.

pub mod home;
pub mod navbar;

pub use home::{load_home, HomeView, ONBOARDING_PAGE};
pub use navbar::{handle_logout, load_navbar_user, NavbarUser};
