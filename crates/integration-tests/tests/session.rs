//! Login, registration and logout against the fake API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use secrecy::SecretString;
use taskboard_client::{
    ClientError, CorruptTokenPolicy, FileTokenStore, MemoryTokenStore, RegisterOutcome,
    SessionStore, TokenStore,
};
use taskboard_core::{Email, Role, UserId};
use taskboard_integration_tests::{ADMIN, ANA, FakeApi, LUIS};

fn password(p: &str) -> SecretString {
    SecretString::from(p.to_string())
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_identity_matches_token_claims() {
    let api = FakeApi::start().await.unwrap();

    for seed in [ADMIN, ANA, LUIS] {
        let session = api.session();
        let claims = session
            .login(seed.username, &password(seed.password))
            .await
            .unwrap();

        let current = session.current_user().unwrap();
        assert_eq!(current, claims);
        assert_eq!(current.id, UserId::new(seed.id));
        assert_eq!(current.username, seed.username);
    }
}

#[tokio::test]
async fn test_login_carries_role() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    session.login(ADMIN.username, &password(ADMIN.password)).await.unwrap();
    assert_eq!(session.current_user().unwrap().role, Some(Role::Admin));

    session.login(ANA.username, &password(ANA.password)).await.unwrap();
    let ana = session.current_user().unwrap();
    assert_eq!(ana.role, Some(Role::User));
    assert_eq!(ana.email.as_deref(), Some("ana@example.com"));
}

#[tokio::test]
async fn test_wrong_password_is_auth_error() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    let err = session
        .login(ANA.username, &password("nope"))
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Auth(m) if m == "Invalid credentials"));
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_unknown_user_is_auth_error() {
    let api = FakeApi::start().await.unwrap();

    let err = api
        .session()
        .login("ghost", &password("x"))
        .await
        .unwrap_err();
    assert!(matches!(&err, ClientError::Auth(m) if m == "User does not exist"));
}

#[tokio::test]
async fn test_server_error_during_login_is_not_reported_as_unreachable() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();

    api.set_outage(true);
    let err = session
        .login(ADMIN.username, &password(ADMIN.password))
        .await
        .unwrap_err();

    let ClientError::Auth(message) = &err else {
        panic!("expected an auth error, got {err:?}");
    };
    assert!(message.starts_with("server returned 500"), "{message}");
    assert!(!message.contains("could not reach"), "{message}");
    assert_eq!(session.current_user().unwrap().username, ANA.username);
}

#[tokio::test]
async fn test_failed_login_keeps_previous_session() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();

    session
        .login(ADMIN.username, &password("wrong"))
        .await
        .unwrap_err();

    assert_eq!(session.current_user().unwrap().username, ANA.username);
}

#[tokio::test]
async fn test_undecodable_token_is_never_persisted() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();

    api.issue_malformed_tokens(true);
    let err = session
        .login(ADMIN.username, &password(ADMIN.password))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
    assert_eq!(session.current_user().unwrap().username, ANA.username);
}

// =============================================================================
// Logout
// =============================================================================

#[tokio::test]
async fn test_logout_clears_identity() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();
    assert!(session.is_authenticated());

    session.logout();
    assert!(session.current_user().is_none());

    // Logging out twice is harmless.
    session.logout();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_requests_after_logout_are_unauthorized() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();
    session.logout();

    let err = taskboard_client::UserService::new(session.api())
        .me()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
    assert_eq!(err.status(), Some(401));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_signs_in() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    let outcome = session
        .register(
            "eva",
            &Email::parse("eva@example.com").unwrap(),
            &password("s3cret"),
        )
        .await
        .unwrap();

    let RegisterOutcome::SignedIn { claims, user } = outcome else {
        panic!("expected a session for the new account");
    };
    assert_eq!(claims.username, "eva");
    assert_eq!(user.unwrap().id, claims.id);
    assert_eq!(session.current_user().unwrap(), claims);
    assert!(api.has_user("eva"));

    // The new account can log in again later.
    session.logout();
    session.login("eva", &password("s3cret")).await.unwrap();
}

#[tokio::test]
async fn test_register_taken_username_surfaces_server_message() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();
    session.login(ANA.username, &password(ANA.password)).await.unwrap();

    let err = session
        .register(
            ANA.username,
            &Email::parse("other@example.com").unwrap(),
            &password("x"),
        )
        .await
        .unwrap_err();

    let ClientError::Auth(message) = err else {
        panic!("expected an auth error, got {err:?}");
    };
    assert_eq!(message, "username: A user with that username already exists.");
    assert_eq!(session.current_user().unwrap().username, ANA.username);
}

// =============================================================================
// Token storage
// =============================================================================

#[tokio::test]
async fn test_corrupt_token_is_purged() {
    let api = FakeApi::start().await.unwrap();
    let tokens = Arc::new(MemoryTokenStore::with_token("garbage"));
    let session = api.session_with(tokens.clone());

    assert!(session.current_user().is_none());
    assert!(tokens.load().unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_token_can_be_kept() {
    let api = FakeApi::start().await.unwrap();
    let tokens = Arc::new(MemoryTokenStore::with_token("garbage"));
    let session = SessionStore::new(api.client(tokens.clone()), CorruptTokenPolicy::Keep);

    assert!(session.current_user().is_none());
    assert!(tokens.load().unwrap().is_some());
}

#[tokio::test]
async fn test_file_session_survives_restart() {
    let api = FakeApi::start().await.unwrap();
    let path = std::env::temp_dir().join(format!(
        "taskboard-it-{}-session.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let first = api.session_with(Arc::new(FileTokenStore::new(&path)));
    let claims = first
        .login(ANA.username, &password(ANA.password))
        .await
        .unwrap();

    // A second process reading the same file sees the same identity.
    let second = api.session_with(Arc::new(FileTokenStore::new(&path)));
    assert_eq!(second.current_user().unwrap(), claims);
    let me = taskboard_client::UserService::new(second.api())
        .me()
        .await
        .unwrap();
    assert_eq!(me.id, claims.id);

    second.logout();
    assert!(first.current_user().is_none());
    assert!(!path.exists());
}
