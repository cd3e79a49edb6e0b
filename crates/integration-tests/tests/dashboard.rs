//! Dashboard behaviour for administrators and regular users.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use taskboard_client::{
    ActiveView, ClientError, DashboardController, NavigationError, Route, SessionStore, ViewData,
};
use taskboard_core::{AlertId, Role};
use taskboard_integration_tests::{ADMIN, ANA, FakeApi, SeedUser};

async fn logged_in(api: &FakeApi, seed: SeedUser) -> SessionStore {
    let session = api.session();
    session
        .login(seed.username, &SecretString::from(seed.password.to_string()))
        .await
        .unwrap();
    session
}

fn views(dashboard: &DashboardController<'_>) -> Vec<ActiveView> {
    dashboard.nav_entries().iter().map(|e| e.view).collect()
}

#[tokio::test]
async fn test_admin_starts_on_users() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ADMIN).await;

    let dashboard = DashboardController::activate(&session).await.unwrap();
    assert!(dashboard.is_admin());
    assert_eq!(dashboard.active_view(), ActiveView::Users);
    assert_eq!(
        views(&dashboard),
        vec![ActiveView::Users, ActiveView::Projects, ActiveView::Tasks]
    );

    let ViewData::Users(users) = dashboard.load_active_view().await.unwrap() else {
        panic!("expected the users view");
    };
    assert_eq!(users.len(), 3);
}

#[tokio::test]
async fn test_regular_user_starts_on_tasks_without_user_management() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;

    let mut dashboard = DashboardController::activate(&session).await.unwrap();
    assert!(!dashboard.is_admin());
    assert_eq!(dashboard.active_view(), ActiveView::Tasks);
    assert!(!views(&dashboard).contains(&ActiveView::Users));

    assert_eq!(
        dashboard.navigate(ActiveView::Users).unwrap_err(),
        NavigationError::NotAvailable(ActiveView::Users)
    );
    assert_eq!(dashboard.active_view(), ActiveView::Tasks);
}

#[tokio::test]
async fn test_activation_loads_alerts() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;

    let dashboard = DashboardController::activate(&session).await.unwrap();
    assert_eq!(dashboard.user().username, ANA.username);
    assert_eq!(dashboard.alerts().len(), 3);
    assert_eq!(dashboard.visible_alerts().count(), 2);
}

#[tokio::test]
async fn test_switching_views_fetches_only_the_new_view() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ADMIN).await;
    let mut dashboard = DashboardController::activate(&session).await.unwrap();
    api.clear_requests();

    dashboard.navigate(ActiveView::Projects).unwrap();
    assert!(api.requests().is_empty());

    let ViewData::Projects(projects) = dashboard.load_active_view().await.unwrap() else {
        panic!("expected the projects view");
    };
    assert_eq!(projects.len(), 2);
    assert_eq!(api.requests(), vec!["GET /projects/".to_string()]);
}

#[tokio::test]
async fn test_mark_all_seen() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;
    let mut dashboard = DashboardController::activate(&session).await.unwrap();

    assert_eq!(dashboard.mark_all_seen().await.unwrap(), 2);
    assert_eq!(dashboard.visible_alerts().count(), 0);
    assert_eq!(api.alert_visible(1), Some(false));
    assert_eq!(api.alert_visible(2), Some(false));

    // Nothing left to hide: no request is made.
    api.clear_requests();
    assert_eq!(dashboard.mark_all_seen().await.unwrap(), 0);
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_dismiss_alert() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;
    let mut dashboard = DashboardController::activate(&session).await.unwrap();

    dashboard.dismiss(AlertId::new(1)).await.unwrap();
    assert!(dashboard.alerts().iter().all(|a| a.id != AlertId::new(1)));
    assert_eq!(api.alert_visible(1), None);
}

#[tokio::test]
async fn test_leaving_view_cancels_pending_fetch() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ADMIN).await;
    let mut dashboard = DashboardController::activate(&session).await.unwrap();

    api.set_latency(Duration::from_millis(500));
    let pending = tokio::spawn(dashboard.view_request().load());
    tokio::time::sleep(Duration::from_millis(50)).await;

    dashboard.navigate(ActiveView::Tasks).unwrap();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(ClientError::Cancelled)));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;
    let dashboard = DashboardController::activate(&session).await.unwrap();

    assert_eq!(dashboard.logout(), Route::Login);
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_activation_requires_accepted_session() {
    let api = FakeApi::start().await.unwrap();
    let session = api.session();

    let err = DashboardController::activate(&session).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));
}

#[tokio::test]
async fn test_server_role_wins_over_promoted_token() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ANA).await;
    api.set_role(ANA.id, "admin");

    let dashboard = DashboardController::activate(&session).await.unwrap();
    assert_eq!(session.current_user().unwrap().role, Some(Role::User));
    assert!(dashboard.is_admin());
    assert_eq!(dashboard.active_view(), ActiveView::Users);
    assert!(views(&dashboard).contains(&ActiveView::Users));
}

#[tokio::test]
async fn test_server_role_wins_over_demoted_token() {
    let api = FakeApi::start().await.unwrap();
    let session = logged_in(&api, ADMIN).await;
    api.set_role(ADMIN.id, "usuario");

    let dashboard = DashboardController::activate(&session).await.unwrap();
    assert_eq!(session.current_user().unwrap().role, Some(Role::Admin));
    assert!(!dashboard.is_admin());
    assert_eq!(dashboard.active_view(), ActiveView::Tasks);
    assert!(!views(&dashboard).contains(&ActiveView::Users));
}
