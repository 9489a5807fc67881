//! Session client for the AI Business Suite dashboard.
//!
//! Exchanges the one-time token returned by the identity provider for a backend
//! session cookie, keeps the current identity, and decides which client routes
//! may render.

pub mod auth;
pub mod config;
pub mod http_client;
pub mod navigation;
pub mod notifications;
pub mod routes;
pub mod runtime;

pub use auth::{AuthError, AuthState, GuardDecision, Identity, SessionToken};
pub use config::ClientConfig;
pub use runtime::AuthRuntime;
