// Authentication Error Types
// Network, status and configuration failures of the session client

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    // Session token errors
    #[error("Session token is empty")]
    EmptyToken,

    // Backend response errors
    #[error("Authentication required")]
    Unauthorized,

    #[error("Unexpected response status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    // Network/HTTP errors
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Backend communication timeout")]
    Timeout,

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    #[error("HTTP client initialization failed: {0}")]
    ClientInitialization(String),
}

// Conversion from reqwest errors
impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout
        } else if err.is_decode() {
            AuthError::JsonError(err.to_string())
        } else {
            AuthError::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for AuthError {
    fn from(err: url::ParseError) -> Self {
        AuthError::InvalidUrl(err.to_string())
    }
}

impl From<figment::Error> for AuthError {
    fn from(err: figment::Error) -> Self {
        AuthError::ConfigError(err.to_string())
    }
}

// HTTP status code mapping
impl AuthError {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Unauthorized => 401,

            AuthError::Status { status, .. } => *status,

            AuthError::ConfigError(_)
            | AuthError::InvalidConfig { .. }
            | AuthError::ClientInitialization(_) => 500,

            AuthError::HttpError(_) => 502,

            AuthError::Timeout => 504,

            _ => 400,
        }
    }

    /// Transient faults a user may retry by hand. Nothing retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            AuthError::Timeout | AuthError::HttpError(_) => true,
            AuthError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
