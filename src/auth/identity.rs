// Identity and Authentication State
// Client-side view of the logged-in user

use serde::{Deserialize, Serialize};

/// Authenticated user as reported by `GET /api/auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Readiness of the identity check
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    /// Not checked yet; consumers must not decide access
    #[default]
    Loading,
    Authenticated(Identity),
    Unauthenticated,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Short label for logs and the CLI
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Loading => "loading",
            AuthState::Authenticated(_) => "authenticated",
            AuthState::Unauthenticated => "unauthenticated",
        }
    }
}

impl From<Option<Identity>> for AuthState {
    fn from(identity: Option<Identity>) -> Self {
        match identity {
            Some(identity) => AuthState::Authenticated(identity),
            None => AuthState::Unauthenticated,
        }
    }
}
