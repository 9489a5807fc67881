/// Authentication backend
///
/// The three session endpoints of the dashboard backend, behind a trait so the
/// exchanger and the identity cache can be driven without a network.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClientConfig;

use super::error::AuthError;
use super::identity::Identity;
use super::token::SessionToken;

pub const ME_PATH: &str = "/auth/me";
pub const SESSION_PATH: &str = "/auth/session";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Body of `POST /api/auth/session`.
///
/// Only `session_token` carries meaning; the backend model still requires the
/// profile fields, so they are sent as empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRequest {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: String,
    pub session_token: String,
}

impl SessionRequest {
    pub fn for_token(token: &SessionToken) -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            name: String::new(),
            picture: String::new(),
            session_token: token.as_str().to_string(),
        }
    }
}

/// Response of `POST /api/auth/session`
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    #[serde(default)]
    pub success: bool,
}

/// Session endpoints of the backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `GET /api/auth/me`; `AuthError::Unauthorized` when there is no valid session cookie
    async fn current_user(&self) -> Result<Identity, AuthError>;

    /// `POST /api/auth/session`; returns the backend's success indicator
    async fn create_session(&self, token: &SessionToken) -> Result<bool, AuthError>;

    /// `POST /api/auth/logout`
    async fn logout(&self) -> Result<(), AuthError>;
}

/// `AuthBackend` over HTTP. Cookies set by the backend live in the client's jar,
/// so clones of the same `reqwest::Client` share the session.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpAuthBackend {
    pub fn new(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    fn check_status(endpoint: &str, response: &reqwest::Response) -> Result<(), AuthError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn current_user(&self) -> Result<Identity, AuthError> {
        let url = self.config.api_url(ME_PATH);
        debug!("Checking current user at {}", url);

        let response = self.client.get(&url).send().await?;
        Self::check_status(ME_PATH, &response)?;

        Ok(response.json::<Identity>().await?)
    }

    async fn create_session(&self, token: &SessionToken) -> Result<bool, AuthError> {
        let url = self.config.api_url(SESSION_PATH);
        debug!("Exchanging session token at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&SessionRequest::for_token(token))
            .send()
            .await?;
        Self::check_status(SESSION_PATH, &response)?;

        let body = response.json::<SessionResponse>().await?;
        Ok(body.success)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let url = self.config.api_url(LOGOUT_PATH);
        debug!("Invalidating server session at {}", url);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::check_status(LOGOUT_PATH, &response)
    }
}
