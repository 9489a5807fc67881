/// Authentication runtime
///
/// Wires the shared HTTP client, the identity cache, the session exchanger,
/// the route guard and the request layer for one application instance.
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::auth::{
    AuthBackend, AuthError, AuthState, GuardDecision, HttpAuthBackend, Identity, IdentityCache,
    RedirectOutcome, RouteGuard, SessionExchanger, SessionToken, login_url,
};
use crate::config::ClientConfig;
use crate::http_client::{ApiClient, RedirectToEntry, build_client};
use crate::navigation::History;
use crate::notifications::{Notice, Notifier};

pub const LOGOUT_NOTICE: &str = "Logged out successfully";

pub struct AuthRuntime {
    config: ClientConfig,
    cache: Arc<IdentityCache>,
    exchanger: SessionExchanger,
    guard: RouteGuard,
    api: ApiClient,
    history: Arc<dyn History>,
    notifier: Arc<dyn Notifier>,
}

impl AuthRuntime {
    /// Runtime talking to the configured backend over HTTP
    pub fn new(
        config: ClientConfig,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        let client = build_client(&config)?;
        let backend = Arc::new(HttpAuthBackend::new(client.clone(), config.clone()));
        Ok(Self::assemble(config, client, backend, history, notifier))
    }

    /// Runtime with a custom session backend; the request layer still uses HTTP
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn AuthBackend>,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AuthError> {
        config.validate()?;
        let client = build_client(&config)?;
        Ok(Self::assemble(config, client, backend, history, notifier))
    }

    fn assemble(
        config: ClientConfig,
        client: reqwest::Client,
        backend: Arc<dyn AuthBackend>,
        history: Arc<dyn History>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cache = Arc::new(IdentityCache::new(Arc::clone(&backend)));
        let exchanger =
            SessionExchanger::new(backend, Arc::clone(&cache), config.dashboard_route.clone());
        let policy = Arc::new(RedirectToEntry::new(
            Arc::clone(&history),
            Arc::clone(&cache),
            config.entry_route.clone(),
        ));
        let api = ApiClient::new(client, config.clone(), policy, Arc::clone(&notifier));

        Self {
            guard: RouteGuard::from_config(&config),
            config,
            cache,
            exchanger,
            api,
            history,
            notifier,
        }
    }

    /// Recover an existing session at application start
    pub async fn bootstrap(&self) -> AuthState {
        self.cache.refresh_identity().await;
        let state = self.cache.state();
        info!(state = state.label(), "Session bootstrap complete");
        state
    }

    /// Process a `#session_id=` redirect at the current location
    pub async fn handle_redirect(&self) -> RedirectOutcome {
        self.exchanger
            .handle_redirect(self.history.as_ref(), self.notifier.as_ref())
            .await
    }

    pub async fn exchange_session(&self, token: &SessionToken) -> bool {
        self.exchanger.exchange_session(token).await
    }

    pub async fn refresh_identity(&self) -> Option<Identity> {
        self.cache.refresh_identity().await
    }

    /// End the session, confirm it to the user and return to the entry route
    pub async fn logout(&self) {
        self.cache.logout().await;
        self.notifier.notify(Notice::success(LOGOUT_NOTICE));
        self.history.push(&self.config.entry_route);
    }

    /// Decision for `path` with the current state; `Wait` while loading
    pub fn guard(&self, path: &str) -> GuardDecision {
        self.guard.check(&self.cache.state(), path)
    }

    /// Decision for `path` once the identity check has settled
    pub async fn resolve_route(&self, path: &str) -> GuardDecision {
        let mut receiver = self.cache.subscribe();
        self.guard.resolve(&mut receiver, path).await
    }

    /// Provider login URL returning to the dashboard
    pub fn login_url(&self) -> Result<Url, AuthError> {
        let return_to = format!(
            "{}{}",
            self.config.app_origin.trim_end_matches('/'),
            self.config.dashboard_route
        );
        login_url(&self.config.provider_url, &return_to)
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &Arc<IdentityCache> {
        &self.cache
    }

    pub fn history(&self) -> &Arc<dyn History> {
        &self.history
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Detach from the cache; responses still in flight are dropped
    pub fn shutdown(&self) {
        self.cache.close();
    }
}
