// Client Configuration
// Backend location, provider redirect and route settings for the session client

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::auth::AuthError;

/// Environment variable prefix, e.g. `AISUITE_BACKEND_URL`
pub const ENV_PREFIX: &str = "AISUITE_";

/// Configuration for the session client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL (the `REACT_APP_BACKEND_URL` of the web build)
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Path prefix of every backend API route
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Origin this application is served from; used to build the provider redirect
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// External identity provider login page
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Unauthenticated entry point
    #[serde(default = "default_entry_route")]
    pub entry_route: String,

    /// Protected landing route after login
    #[serde(default = "default_dashboard_route")]
    pub dashboard_route: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            api_prefix: default_api_prefix(),
            app_origin: default_app_origin(),
            provider_url: default_provider_url(),
            entry_route: default_entry_route(),
            dashboard_route: default_dashboard_route(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, an optional TOML file and `AISUITE_*` variables.
    /// Later sources override earlier ones.
    pub fn load(path: Option<&Path>) -> Result<Self, AuthError> {
        let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));

        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }

        let config: ClientConfig = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Create config from environment variables only
    pub fn from_env() -> Result<Self, AuthError> {
        Self::load(None)
    }

    /// Configuration pointing at a local test backend
    pub fn test_config(backend_url: &str) -> Self {
        Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            request_timeout_ms: 5000,
            ..Self::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_http_url("backend_url", &self.backend_url)?;
        validate_http_url("app_origin", &self.app_origin)?;
        validate_http_url("provider_url", &self.provider_url)?;

        validate_route("api_prefix", &self.api_prefix)?;
        validate_route("entry_route", &self.entry_route)?;
        validate_route("dashboard_route", &self.dashboard_route)?;

        if self.request_timeout_ms == 0 {
            return Err(AuthError::InvalidConfig {
                key: "request_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Full URL of an API path such as `/auth/me`
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}{}{}",
            self.backend_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/'),
            path
        )
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), AuthError> {
    let parsed = url::Url::parse(value).map_err(|e| AuthError::InvalidConfig {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AuthError::InvalidConfig {
            key: key.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

fn validate_route(key: &str, value: &str) -> Result<(), AuthError> {
    if !value.starts_with('/') {
        return Err(AuthError::InvalidConfig {
            key: key.to_string(),
            reason: "must start with '/'".to_string(),
        });
    }
    Ok(())
}

fn default_backend_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_app_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_provider_url() -> String {
    "https://auth.emergentagent.com/".to_string()
}

fn default_entry_route() -> String {
    "/".to_string()
}

fn default_dashboard_route() -> String {
    "/dashboard".to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}
