// Route Guard
// Access decisions for client routes based on the identity state

use tokio::sync::watch;
use tracing::debug;

use crate::config::ClientConfig;
use crate::routes::Route;

use super::identity::AuthState;

/// What the view layer should do for a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity check pending: show the neutral waiting state
    Wait,
    /// Render the route
    Render(Route),
    /// Replace the current location with this path
    Redirect(String),
    /// Path is not part of the application
    NotFound,
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    entry_route: String,
    dashboard_route: String,
}

impl RouteGuard {
    pub fn new(entry_route: impl Into<String>, dashboard_route: impl Into<String>) -> Self {
        Self {
            entry_route: entry_route.into(),
            dashboard_route: dashboard_route.into(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.entry_route.clone(), config.dashboard_route.clone())
    }

    /// Decide access to `path` for the given state.
    ///
    /// While the state is loading no decision is made, so protected content is
    /// never shown before the identity check settles.
    pub fn check(&self, state: &AuthState, path: &str) -> GuardDecision {
        if state.is_loading() {
            return GuardDecision::Wait;
        }

        let Some(route) = Route::from_path(path) else {
            return GuardDecision::NotFound;
        };

        let decision = match (route.is_protected(), state.is_authenticated()) {
            (true, true) => GuardDecision::Render(route),
            (true, false) => GuardDecision::Redirect(self.entry_route.clone()),
            // Logged-in users skip the landing page
            (false, true) => GuardDecision::Redirect(self.dashboard_route.clone()),
            (false, false) => GuardDecision::Render(route),
        };

        debug!(path, state = state.label(), ?decision, "Route guard decision");
        decision
    }

    /// Wait for the identity check to settle, then decide
    pub async fn resolve(
        &self,
        receiver: &mut watch::Receiver<AuthState>,
        path: &str,
    ) -> GuardDecision {
        let settled = receiver
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        // Sender gone: decide on whatever was last published
        let state = match settled {
            Ok(state) => state,
            Err(_) => receiver.borrow().clone(),
        };
        self.check(&state, path)
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(Route::Landing.path(), Route::Dashboard.path())
    }
}
