//! HTTP Client Module
//!
//! Credentialed request layer shared by the session core and the surrounding
//! pages. One `reqwest::Client` with a cookie store carries the backend session
//! cookie for every call.
//!
//! # Failure policy
//!
//! 1. A 401 response invokes the injected [`UnauthorizedPolicy`] and the body is discarded
//! 2. Any other non-2xx status is returned as [`AuthError::Status`]
//! 3. Transport faults are returned as-is
//!
//! Failures other than 401 also raise an error notice. They never touch
//! identity state or navigation, so the user can simply retry.

use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{AuthError, IdentityCache};
use crate::config::ClientConfig;
use crate::navigation::History;
use crate::notifications::{Notice, Notifier};

pub const REQUEST_FAILED_NOTICE: &str = "Request failed. Please try again.";

/// Build the cookie-carrying client every backend call goes through
pub fn build_client(config: &ClientConfig) -> Result<reqwest::Client, AuthError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout())
        .build()
        .map_err(|e| AuthError::ClientInitialization(e.to_string()))
}

/// Reaction to a 401 from an authenticated call
pub trait UnauthorizedPolicy: Send + Sync {
    fn on_unauthorized(&self, path: &str);
}

/// Leaves navigation and identity alone
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPolicy;

impl UnauthorizedPolicy for NoopPolicy {
    fn on_unauthorized(&self, path: &str) {
        debug!(path, "401 ignored by policy");
    }
}

/// Clears the identity and sends the user to the unauthenticated entry point
pub struct RedirectToEntry {
    history: Arc<dyn History>,
    cache: Arc<IdentityCache>,
    entry_route: String,
}

impl RedirectToEntry {
    pub fn new(
        history: Arc<dyn History>,
        cache: Arc<IdentityCache>,
        entry_route: impl Into<String>,
    ) -> Self {
        Self {
            history,
            cache,
            entry_route: entry_route.into(),
        }
    }
}

impl UnauthorizedPolicy for RedirectToEntry {
    fn on_unauthorized(&self, path: &str) {
        warn!(path, entry = %self.entry_route, "Session rejected, redirecting to entry");
        self.cache.reset();
        self.history.push(&self.entry_route);
    }
}

/// Credentialed JSON client under the backend's `/api` prefix
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
    policy: Arc<dyn UnauthorizedPolicy>,
    notifier: Arc<dyn Notifier>,
}

impl ApiClient {
    pub fn new(
        client: reqwest::Client,
        config: ClientConfig,
        policy: Arc<dyn UnauthorizedPolicy>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            config,
            policy,
            notifier,
        }
    }

    /// Same client and configuration with a different 401 policy
    pub fn with_policy(&self, policy: Arc<dyn UnauthorizedPolicy>) -> Self {
        Self {
            client: self.client.clone(),
            config: self.config.clone(),
            policy,
            notifier: Arc::clone(&self.notifier),
        }
    }

    /// `GET <api>/<path>` decoded as JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AuthError> {
        let request = self.client.get(self.config.api_url(path));
        self.execute(path, request).await
    }

    /// `POST <api>/<path>` with a JSON body, decoded as JSON
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.client.post(self.config.api_url(path)).json(body);
        self.execute(path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, AuthError> {
        debug!(path, "API request");
        let result = self.send(path, request).await;

        match &result {
            Err(AuthError::Unauthorized) => {}
            Err(e) => {
                warn!(path, error = %e, retryable = e.is_retryable(), "API request failed");
                self.notifier.notify(Notice::error(REQUEST_FAILED_NOTICE));
            }
            Ok(_) => {}
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, AuthError> {
        let response = request.send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.policy.on_unauthorized(path);
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}
