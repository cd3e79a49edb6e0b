//! Route gating against a live session.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use taskboard_client::{AuthGuard, AuthState, Navigation, Route};
use taskboard_integration_tests::{ANA, FakeApi};

#[tokio::test]
async fn test_dashboard_requires_login() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    let guard = AuthGuard::new(&session);

    assert_eq!(guard.state(), AuthState::Unauthenticated);
    assert_eq!(guard.navigate("/dashboard"), Navigation::Redirect(Route::Login));
    assert_eq!(guard.navigate("/login"), Navigation::Render(Route::Login));
    assert_eq!(guard.navigate("/register"), Navigation::Render(Route::Register));
}

#[tokio::test]
async fn test_guard_follows_session() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    session
        .login(ANA.username, &SecretString::from(ANA.password.to_string()))
        .await
        .unwrap();

    {
        let guard = AuthGuard::new(&session);
        assert_eq!(guard.navigate("/dashboard/"), Navigation::Render(Route::Dashboard));
        assert_eq!(guard.require().unwrap().username, ANA.username);
        assert!(matches!(guard.state(), AuthState::Authenticated(c) if c.username == ANA.username));
    }

    session.logout();
    let guard = AuthGuard::new(&session);
    assert_eq!(guard.navigate("/dashboard"), Navigation::Redirect(Route::Login));
    assert_eq!(guard.require().unwrap_err(), Navigation::Redirect(Route::Login));
}

#[tokio::test]
async fn test_unknown_path_redirects_to_login() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    assert_eq!(
        AuthGuard::new(&session).navigate("/settings"),
        Navigation::Redirect(Route::Login)
    );
}
