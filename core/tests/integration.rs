//! Full profile lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ProfileClient` and
//! the page loaders over real HTTP through `ReqwestTransport`.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pyramid_core::pages::{load_home, load_navbar_user, HomeView, NavbarUser};
use pyramid_core::{
    ApiClient, ApiError, AuthProvider, ClientConfig, CreateProfile, Outcome, ProfileClient,
    SessionAuth, UpdateProfile,
};

fn token_for(sub: &str) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{sub}","exp":4102444800}}"#));
    format!("e30.{payload}.sig")
}

async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}/")
}

fn profile_client(base_url: &str, auth: Arc<SessionAuth>) -> ProfileClient {
    let auth: Arc<dyn AuthProvider> = auth;
    ProfileClient::new(ApiClient::with_reqwest(ClientConfig::new(base_url), auth))
}

#[tokio::test]
async fn profile_lifecycle() {
    let base_url = start_server().await;
    let auth = Arc::new(SessionAuth::with_token(token_for("u-ada")));
    let profiles = profile_client(&base_url, auth.clone());

    // Step 1: nothing yet, so the home page sends us to onboarding.
    assert_eq!(profiles.get_profile(None).await.unwrap(), Outcome::NotFound);
    assert!(!profiles.has_profile().await);
    assert_eq!(
        load_home(auth.as_ref(), &profiles).await,
        HomeView::Redirect("onboarding.html".to_string())
    );
    assert_eq!(load_navbar_user(&profiles).await, NavbarUser::Unchanged);

    // Step 2: invalid create is rejected with the server's message.
    let err = profiles
        .create_profile(&CreateProfile {
            display_name: "A".to_string(),
            bio: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
    assert_eq!(err.to_string(), "Display name must be at least 2 characters");

    // Step 3: create.
    let created = profiles
        .create_profile(&CreateProfile {
            display_name: "Ada".to_string(),
            bio: None,
        })
        .await
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(created.user_id, "u-ada");
    assert_eq!(created.display_name, "Ada");

    // Step 4: get it back; pages now greet by name.
    let fetched = profiles.get_profile(None).await.unwrap();
    assert_eq!(fetched, Outcome::Found(created.clone()));
    assert!(profiles.has_profile().await);
    assert_eq!(
        load_home(auth.as_ref(), &profiles).await,
        HomeView::Greeting("Ada".to_string())
    );
    assert_eq!(
        load_navbar_user(&profiles).await,
        NavbarUser::DisplayName("Ada".to_string())
    );

    // Step 5: partial update.
    let updated = profiles
        .update_profile(&UpdateProfile {
            display_name: None,
            bio: Some("Climber".to_string()),
        })
        .await
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(updated.display_name, "Ada");
    assert_eq!(updated.bio.as_deref(), Some("Climber"));

    // Step 6: another user reads it by id.
    let bob = profile_client(&base_url, Arc::new(SessionAuth::with_token(token_for("u-bob"))));
    assert_eq!(bob.get_profile(None).await.unwrap(), Outcome::NotFound);
    assert_eq!(
        bob.get_profile(Some("u-ada")).await.unwrap(),
        Outcome::Found(updated)
    );
}

#[tokio::test]
async fn signed_out_session_never_reaches_server() {
    let base_url = start_server().await;
    let auth = Arc::new(SessionAuth::new());
    let profiles = profile_client(&base_url, auth.clone());

    let err = profiles.get_profile(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(
        load_home(auth.as_ref(), &profiles).await,
        HomeView::Redirect("index.html".to_string())
    );
}

#[tokio::test]
async fn server_rejects_garbage_token() {
    let base_url = start_server().await;
    let profiles = profile_client(&base_url, Arc::new(SessionAuth::with_token("garbage")));

    let err = profiles.get_profile(None).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 401, .. }));
    assert_eq!(err.to_string(), "Unauthorized - Invalid token");
    assert_eq!(
        load_navbar_user(&profiles).await,
        NavbarUser::DisplayName("User".to_string())
    );
}
