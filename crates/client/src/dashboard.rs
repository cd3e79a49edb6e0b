//! Post-login dashboard.
//!
//! Activation fetches the logged-in user's record and alerts once, then
//! picks the initial view from the role: administrators land on users,
//! everyone else on tasks. Switching views is an in-memory selection; the
//! only network traffic it causes is the new view's own fetch.
//!
//! The user-management entry is only offered to administrators. That is the
//! whole of the client-side enforcement; the API re-checks every request.

use std::fmt;

use taskboard_core::{Alert, AlertId, Project, ProjectTasks, User};
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::cancel::ViewScope;
use crate::error::ClientError;
use crate::guard::Route;
use crate::services::{AlertService, ProjectService, TaskService, UserService};
use crate::session::SessionStore;

/// Resource views selectable in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActiveView {
    Users,
    Projects,
    Tasks,
}

impl ActiveView {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Projects => "Projects",
            Self::Tasks => "Tasks",
        }
    }
}

impl fmt::Display for ActiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl std::str::FromStr for ActiveView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" => Ok(Self::Users),
            "projects" => Ok(Self::Projects),
            "tasks" => Ok(Self::Tasks),
            other => Err(format!("unknown view `{other}` (expected users, projects or tasks)")),
        }
    }
}

/// A navigation entry shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub view: ActiveView,
    pub label: &'static str,
}

/// Navigation entries offered for a role.
#[must_use]
pub fn nav_entries(is_admin: bool) -> Vec<NavEntry> {
    let views: &[ActiveView] = if is_admin {
        &[ActiveView::Users, ActiveView::Projects, ActiveView::Tasks]
    } else {
        &[ActiveView::Projects, ActiveView::Tasks]
    };
    views
        .iter()
        .map(|&view| NavEntry {
            view,
            label: view.label(),
        })
        .collect()
}

/// View selected right after activation.
#[must_use]
pub const fn initial_view(is_admin: bool) -> ActiveView {
    if is_admin {
        ActiveView::Users
    } else {
        ActiveView::Tasks
    }
}

/// Data fetched for a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewData {
    Users(Vec<User>),
    Projects(Vec<Project>),
    Tasks(Vec<ProjectTasks>),
}

/// Errors from dashboard navigation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// The view has no navigation entry for this user.
    #[error("{0} is not available")]
    NotAvailable(ActiveView),
}

/// A pending fetch for one view, detached from the controller so that the
/// view can be switched while it runs.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    api: ApiClient,
    view: ActiveView,
    scope: ViewScope,
}

impl ViewRequest {
    #[must_use]
    pub const fn view(&self) -> ActiveView {
        self.view
    }

    /// Fetch the view's data.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Cancelled`] if the view was left before the
    /// data arrived, otherwise the service's error.
    pub async fn load(self) -> Result<ViewData, ClientError> {
        let Self { api, view, scope } = self;
        scope.run(fetch_view(&api, view)).await
    }
}

async fn fetch_view(api: &ApiClient, view: ActiveView) -> Result<ViewData, ClientError> {
    match view {
        ActiveView::Users => UserService::new(api).list().await.map(ViewData::Users),
        ActiveView::Projects => ProjectService::new(api).list().await.map(ViewData::Projects),
        ActiveView::Tasks => TaskService::new(api).list().await.map(ViewData::Tasks),
    }
}

/// The dashboard shell.
pub struct DashboardController<'a> {
    session: &'a SessionStore,
    user: User,
    alerts: Vec<Alert>,
    active: ActiveView,
    scope: ViewScope,
}

impl fmt::Debug for DashboardController<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardController")
            .field("user", &self.user.username)
            .field("alerts", &self.alerts.len())
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl<'a> DashboardController<'a> {
    /// Enter the dashboard.
    ///
    /// Fetches the logged-in user's record and alerts, and selects the
    /// initial view. If the session token and the server's record disagree
    /// on identity or role, the server's record wins.
    ///
    /// # Errors
    ///
    /// Returns the error of either fetch; [`ClientError::Unauthorized`] if
    /// the API no longer accepts the session.
    #[instrument(skip(session))]
    pub async fn activate(session: &'a SessionStore) -> Result<Self, ClientError> {
        let api = session.api();
        let user = UserService::new(api).me().await?;

        if let Some(claims) = session.current_user() {
            let role_differs = claims.role.is_some() && claims.role != user.role;
            if claims.id != user.id || role_differs {
                warn!(
                    token_user = %claims.id,
                    token_role = ?claims.role,
                    server_user = %user.id,
                    server_role = ?user.role,
                    "Session token disagrees with the server's user record, using the server's"
                );
            }
        }

        let alerts = AlertService::new(api).list().await?;
        let active = initial_view(user.is_admin());
        info!(user_id = %user.id, view = %active, "Dashboard activated");

        Ok(Self {
            session,
            user,
            alerts,
            active,
            scope: ViewScope::new(),
        })
    }

    /// The logged-in user, as reported by the server.
    #[must_use]
    pub const fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Navigation entries offered to this user.
    #[must_use]
    pub fn nav_entries(&self) -> Vec<NavEntry> {
        nav_entries(self.is_admin())
    }

    #[must_use]
    pub const fn active_view(&self) -> ActiveView {
        self.active
    }

    /// Scope of the active view.
    #[must_use]
    pub fn scope(&self) -> ViewScope {
        self.scope.clone()
    }

    /// Switch to `view`, cancelling fetches still running for the old one.
    ///
    /// Re-selecting the active view starts a fresh scope as well.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::NotAvailable`] if the user has no entry
    /// for `view`; the active view is then unchanged.
    pub fn navigate(&mut self, view: ActiveView) -> Result<ViewScope, NavigationError> {
        if !self.nav_entries().iter().any(|e| e.view == view) {
            return Err(NavigationError::NotAvailable(view));
        }

        self.scope.cancel();
        self.scope = ViewScope::new();
        self.active = view;
        Ok(self.scope.clone())
    }

    /// A fetch for the active view under its current scope.
    #[must_use]
    pub fn view_request(&self) -> ViewRequest {
        ViewRequest {
            api: self.session.api().clone(),
            view: self.active,
            scope: self.scope.clone(),
        }
    }

    /// Fetch the active view's data.
    ///
    /// # Errors
    ///
    /// See [`ViewRequest::load`].
    pub async fn load_active_view(&self) -> Result<ViewData, ClientError> {
        self.view_request().load().await
    }

    /// All alerts fetched at activation, as updated locally since.
    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// Alerts not yet marked as seen.
    pub fn visible_alerts(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.visible)
    }

    /// Hide every visible alert. Returns how many were hidden.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error; local copies are unchanged then.
    pub async fn mark_all_seen(&mut self) -> Result<usize, ClientError> {
        let ids: Vec<AlertId> = self.visible_alerts().map(|a| a.id).collect();
        if ids.is_empty() {
            return Ok(0);
        }

        AlertService::new(self.session.api()).hide(&ids).await?;

        for alert in &mut self.alerts {
            if ids.contains(&alert.id) {
                alert.visible = false;
            }
        }
        Ok(ids.len())
    }

    /// Delete one alert.
    ///
    /// # Errors
    ///
    /// Returns the API or transport error; the local copy is kept then.
    pub async fn dismiss(&mut self, id: AlertId) -> Result<(), ClientError> {
        AlertService::new(self.session.api()).delete(id).await?;
        self.alerts.retain(|a| a.id != id);
        Ok(())
    }

    /// Leave the dashboard, ending the session.
    #[must_use]
    pub fn logout(self) -> Route {
        self.scope.cancel();
        self.session.logout();
        Route::Login
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_users_entry() {
        let views: Vec<ActiveView> = nav_entries(true).iter().map(|e| e.view).collect();
        assert_eq!(views, vec![ActiveView::Users, ActiveView::Projects, ActiveView::Tasks]);
        assert_eq!(initial_view(true), ActiveView::Users);
    }

    #[test]
    fn test_non_admin_never_sees_users_entry() {
        let entries = nav_entries(false);
        assert!(entries.iter().all(|e| e.view != ActiveView::Users));
        assert_eq!(initial_view(false), ActiveView::Tasks);
    }

    #[test]
    fn test_view_parse() {
        assert_eq!("Projects".parse::<ActiveView>().unwrap(), ActiveView::Projects);
        assert!("settings".parse::<ActiveView>().is_err());
    }
}
