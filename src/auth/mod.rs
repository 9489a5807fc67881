// Authentication Module
// Session token exchange, identity cache and route guard

pub mod backend;
pub mod cache;
pub mod error;
pub mod exchanger;
pub mod guard;
pub mod identity;
pub mod token;

pub use backend::{AuthBackend, HttpAuthBackend, SessionRequest, SessionResponse};
pub use cache::IdentityCache;
pub use error::AuthError;
pub use exchanger::{ExchangeOutcome, RedirectOutcome, SessionExchanger};
pub use guard::{GuardDecision, RouteGuard};
pub use identity::{AuthState, Identity};
pub use token::{SessionToken, login_url, scrubbed_path};
