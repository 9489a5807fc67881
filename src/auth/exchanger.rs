/// Session Exchanger
///
/// Turns the one-time provider token from the redirect fragment into a backend
/// session cookie, then refreshes the identity cache.
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::navigation::History;
use crate::notifications::{Notice, Notifier};

use super::backend::AuthBackend;
use super::cache::IdentityCache;
use super::token::{SessionToken, scrubbed_path};

pub const WELCOME_NOTICE: &str = "Welcome to AI Business Suite!";
pub const REJECTED_NOTICE: &str = "Authentication failed. Please try again.";
pub const FAILED_NOTICE: &str = "Authentication error. Please try again.";

/// Result of one exchange attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Backend accepted the token and set the session cookie
    Established,
    /// Backend answered `{success: false}`
    Rejected,
    /// Transport, status or decoding failure
    Failed(String),
    /// Token already consumed or in flight; nothing was sent
    Duplicate,
}

impl ExchangeOutcome {
    pub fn is_established(&self) -> bool {
        matches!(self, ExchangeOutcome::Established)
    }
}

/// Result of handling a provider redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Location carried no `session_id`; nothing happened
    NoToken,
    Exchanged(ExchangeOutcome),
}

pub struct SessionExchanger {
    backend: Arc<dyn AuthBackend>,
    cache: Arc<IdentityCache>,
    consumed: Mutex<HashSet<SessionToken>>,
    dashboard_route: String,
}

impl SessionExchanger {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        cache: Arc<IdentityCache>,
        dashboard_route: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            cache,
            consumed: Mutex::new(HashSet::new()),
            dashboard_route: dashboard_route.into(),
        }
    }

    /// Exchange `token` for a session; `true` only when a new session was established
    pub async fn exchange_session(&self, token: &SessionToken) -> bool {
        self.exchange(token).await.is_established()
    }

    /// Exchange `token` for a session.
    ///
    /// A token is claimed before the request is sent, so a second call with the
    /// same token (even while the first is in flight) is a `Duplicate` no-op.
    /// The identity refresh starts only after the exchange response arrived.
    pub async fn exchange(&self, token: &SessionToken) -> ExchangeOutcome {
        if !self.claim(token) {
            debug!(?token, "Session token already consumed");
            return ExchangeOutcome::Duplicate;
        }

        match self.backend.create_session(token).await {
            Ok(true) => {
                info!("Session established");
                self.cache.refresh_identity().await;
                ExchangeOutcome::Established
            }
            Ok(false) => {
                warn!("Session exchange rejected by backend");
                ExchangeOutcome::Rejected
            }
            Err(e) => {
                warn!(error = %e, "Session exchange failed");
                ExchangeOutcome::Failed(e.to_string())
            }
        }
    }

    /// Handle a provider redirect at `history`'s current location.
    ///
    /// After any attempt the current entry is replaced by its bare path, so a
    /// reload cannot resubmit the token.
    pub async fn handle_redirect(
        &self,
        history: &dyn History,
        notifier: &dyn Notifier,
    ) -> RedirectOutcome {
        let location = history.current();
        let Some(token) = SessionToken::from_location(&location) else {
            return RedirectOutcome::NoToken;
        };

        let outcome = self.exchange(&token).await;
        history.replace(&scrubbed_path(&location));

        match &outcome {
            ExchangeOutcome::Established => {
                notifier.notify(Notice::success(WELCOME_NOTICE));
                history.push(&self.dashboard_route);
            }
            ExchangeOutcome::Rejected => notifier.notify(Notice::error(REJECTED_NOTICE)),
            ExchangeOutcome::Failed(_) => notifier.notify(Notice::error(FAILED_NOTICE)),
            ExchangeOutcome::Duplicate => {}
        }

        RedirectOutcome::Exchanged(outcome)
    }

    fn claim(&self, token: &SessionToken) -> bool {
        match self.consumed.lock() {
            Ok(mut consumed) => consumed.insert(token.clone()),
            Err(poisoned) => poisoned.into_inner().insert(token.clone()),
        }
    }
}
