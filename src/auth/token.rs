// Session Token Handling
// Extraction from the provider redirect fragment, URL scrubbing and login URL

use std::fmt;
use url::Url;

use super::error::AuthError;

/// Fragment parameter the identity provider uses for the one-time token
pub const SESSION_FRAGMENT_PARAM: &str = "session_id";

/// Query parameter carrying the post-login return address
pub const REDIRECT_QUERY_PARAM: &str = "redirect";

/// Opaque one-time token issued by the identity provider
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = token.into();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        Ok(Self(token))
    }

    /// Read `session_id` from the fragment of `location`.
    /// A missing or empty parameter yields `None`.
    pub fn from_location(location: &Url) -> Option<Self> {
        let fragment = location.fragment()?;
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(fragment).ok()?;

        pairs
            .into_iter()
            .find(|(key, _)| key == SESSION_FRAGMENT_PARAM)
            .and_then(|(_, value)| Self::new(value).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials and never appear in logs
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<redacted {} chars>)", self.0.len())
    }
}

/// Path-only form of `location`: no query, no fragment
pub fn scrubbed_path(location: &Url) -> String {
    location.path().to_string()
}

/// Build the provider login URL that returns to `return_to` after authentication
pub fn login_url(provider_url: &str, return_to: &str) -> Result<Url, AuthError> {
    let mut url = Url::parse(provider_url)?;
    url.query_pairs_mut()
        .append_pair(REDIRECT_QUERY_PARAM, return_to);
    Ok(url)
}
