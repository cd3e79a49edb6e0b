//! Route guard.
//!
//! Access is decided by whether the session store yields an identity at the
//! moment of navigation. There is no freshness check: an expired token that
//! still decodes counts as logged in, and the API's rejection is what ends
//! such a session.

use taskboard_core::TokenClaims;

use crate::session::SessionStore;

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    /// Path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Look up a route by path. Trailing slashes are ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            "/login" => Some(Self::Login),
            "/register" => Some(Self::Register),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    /// Whether the route requires a session.
    #[must_use]
    pub const fn is_protected(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Show the requested route.
    Render(Route),
    /// Show this route instead.
    Redirect(Route),
}

/// Authentication state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Authenticated(TokenClaims),
    Unauthenticated,
}

/// Gates protected routes on the presence of a session.
#[derive(Debug, Clone, Copy)]
pub struct AuthGuard<'a> {
    session: &'a SessionStore,
}

impl<'a> AuthGuard<'a> {
    #[must_use]
    pub const fn new(session: &'a SessionStore) -> Self {
        Self { session }
    }

    /// Current authentication state.
    #[must_use]
    pub fn state(&self) -> AuthState {
        self.session
            .current_user()
            .map_or(AuthState::Unauthenticated, AuthState::Authenticated)
    }

    /// Resolve a navigation to `path`.
    ///
    /// Unknown paths go to the login screen. Protected routes go to the
    /// login screen when no one is logged in; the requested destination is
    /// not remembered.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Navigation {
        let Some(route) = Route::from_path(path) else {
            return Navigation::Redirect(Route::Login);
        };

        if route.is_protected() && !self.session.is_authenticated() {
            tracing::debug!(path, "Redirecting unauthenticated navigation to login");
            return Navigation::Redirect(Route::Login);
        }

        Navigation::Render(route)
    }

    /// Require a session before entering a protected screen.
    ///
    /// # Errors
    ///
    /// Returns the redirect to the login screen when no one is logged in.
    pub fn require(&self) -> Result<TokenClaims, Navigation> {
        self.session
            .current_user()
            .ok_or(Navigation::Redirect(Route::Login))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::CorruptTokenPolicy;
    use crate::storage::MemoryTokenStore;

    // {"id":2,"username":"ana","rol":"admin","exp":1}
    const EXPIRED: &str =
        "eyJhbGciOiJIUzI1NiJ9.eyJpZCI6MiwidXNlcm5hbWUiOiJhbmEiLCJyb2wiOiJhZG1pbiIsImV4cCI6MX0.c2ln";

    fn session(store: MemoryTokenStore) -> SessionStore {
        let api = ApiClient::with_http(
            reqwest::Client::new(),
            url::Url::parse("http://127.0.0.1:9/").unwrap(),
            Arc::new(store),
        );
        SessionStore::new(api, CorruptTokenPolicy::Purge)
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::from_path("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(Route::from_path("/login"), Some(Route::Login));
        assert_eq!(Route::from_path("/settings"), None);
        assert_eq!(Route::Register.path(), "/register");
    }

    #[test]
    fn test_unauthenticated_redirects_protected() {
        let session = session(MemoryTokenStore::new());
        let guard = AuthGuard::new(&session);

        assert_eq!(guard.state(), AuthState::Unauthenticated);
        assert_eq!(guard.navigate("/dashboard"), Navigation::Redirect(Route::Login));
        assert_eq!(guard.navigate("/login"), Navigation::Render(Route::Login));
        assert_eq!(guard.navigate("/register"), Navigation::Render(Route::Register));
        assert_eq!(guard.require(), Err(Navigation::Redirect(Route::Login)));
    }

    #[test]
    fn test_unknown_path_redirects_to_login() {
        let session = session(MemoryTokenStore::with_token(EXPIRED));
        let guard = AuthGuard::new(&session);
        assert_eq!(guard.navigate("/nowhere"), Navigation::Redirect(Route::Login));
    }

    #[test]
    fn test_expired_but_parsable_token_is_authenticated() {
        let session = session(MemoryTokenStore::with_token(EXPIRED));
        let guard = AuthGuard::new(&session);

        assert_eq!(guard.navigate("/dashboard"), Navigation::Render(Route::Dashboard));
        assert_eq!(guard.require().unwrap().exp, Some(1));
    }

    #[test]
    fn test_corrupt_token_is_unauthenticated() {
        let session = session(MemoryTokenStore::with_token("not a token"));
        let guard = AuthGuard::new(&session);
        assert_eq!(guard.navigate("/dashboard"), Navigation::Redirect(Route::Login));
    }
}
