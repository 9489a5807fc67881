//! Session Flow Integration Tests
//!
//! Drives the session client against the mock backend over real HTTP:
//! - Token exchange, cookie and identity refresh
//! - Replay of a consumed token
//! - Redirect handling and URL scrubbing
//! - Logout with a failing endpoint
//! - 401 policy of the request layer


use aisuite_session::auth::{ExchangeOutcome, RedirectOutcome};
use aisuite_session::http_client::{ApiClient, NoopPolicy, REQUEST_FAILED_NOTICE};
use aisuite_session::navigation::{History, MemoryHistory};
use aisuite_session::notifications::{NoticeLevel, NoticeLog};
use aisuite_session::routes::Route;
use aisuite_session::{
    AuthError, AuthRuntime, AuthState, ClientConfig, GuardDecision, Identity, SessionToken,
};
use mock_backend::MockBackend;
use serde_json::json;
use std::sync::Arc;

struct Harness {
    backend: MockBackend,
    runtime: AuthRuntime,
    history: Arc<MemoryHistory>,
    notices: Arc<NoticeLog>,
}

async fn harness(location: &str) -> Harness {
    let backend = MockBackend::start()
        .await
        .expect("Failed to start mock backend");
    backend.accept_token(
        "abc123",
        json!({"id": "u1", "email": "a@b.com", "name": "Ada", "picture": null}),
    );

    let history = Arc::new(MemoryHistory::parse(location).unwrap());
    let notices = Arc::new(NoticeLog::new());
    let runtime = AuthRuntime::new(
        ClientConfig::test_config(&backend.base_url()),
        history.clone(),
        notices.clone(),
    )
    .expect("Failed to build runtime");

    Harness {
        backend,
        runtime,
        history,
        notices,
    }
}

fn ada() -> Identity {
    Identity {
        id: "u1".to_string(),
        email: "a@b.com".to_string(),
        name: "Ada".to_string(),
        picture: None,
    }
}

// ============================================================================
// Exchange and identity
// ============================================================================

#[tokio::test]
async fn test_valid_token_establishes_session() {
    let h = harness("http://localhost:3000/#session_id=abc123").await;

    let outcome = h.runtime.handle_redirect().await;

    assert_eq!(
        outcome,
        RedirectOutcome::Exchanged(ExchangeOutcome::Established)
    );
    assert_eq!(h.runtime.cache().state(), AuthState::Authenticated(ada()));
    assert_eq!(h.history.current().path(), "/dashboard");
    assert_eq!(
        h.runtime.resolve_route("/dashboard").await,
        GuardDecision::Render(Route::Dashboard)
    );

    let body = h.backend.with_state(|s| s.last_exchange_body.clone()).unwrap();
    assert_eq!(
        body,
        json!({"id": "", "email": "", "name": "", "picture": "", "session_token": "abc123"})
    );

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_cookie_survives_for_later_checks() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();

    assert!(h.runtime.exchange_session(&token).await);
    assert_eq!(h.runtime.refresh_identity().await, Some(ada()));
    assert_eq!(h.backend.with_state(|s| s.me_calls), 2);

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_rejected_token_stays_on_landing() {
    let h = harness("http://localhost:3000/#session_id=expired").await;
    h.runtime.bootstrap().await;

    let outcome = h.runtime.handle_redirect().await;

    assert_eq!(
        outcome,
        RedirectOutcome::Exchanged(ExchangeOutcome::Rejected)
    );
    assert_eq!(h.runtime.cache().state(), AuthState::Unauthenticated);
    assert_eq!(h.history.current().as_str(), "http://localhost:3000/");
    assert_eq!(
        h.runtime.guard("/"),
        GuardDecision::Render(Route::Landing)
    );

    let notices = h.notices.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_backend_error_during_exchange_is_failure() {
    let h = harness("http://localhost:3000/#session_id=boom").await;

    let outcome = h.runtime.handle_redirect().await;

    assert!(matches!(
        outcome,
        RedirectOutcome::Exchanged(ExchangeOutcome::Failed(_))
    ));
    assert!(h.runtime.cache().state().is_loading());
    assert!(h.history.current().fragment().is_none());

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_replayed_token_reaches_backend_once() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();

    assert!(h.runtime.exchange_session(&token).await);
    assert!(!h.runtime.exchange_session(&token).await);

    assert_eq!(h.backend.with_state(|s| s.exchange_calls), 1);
    assert_eq!(h.backend.with_state(|s| s.sessions.len()), 1);

    h.backend.shutdown().await;
}

// ============================================================================
// Unauthenticated and logout
// ============================================================================

#[tokio::test]
async fn test_no_cookie_redirects_dashboard_to_entry() {
    let h = harness("http://localhost:3000/dashboard").await;

    assert_eq!(h.runtime.guard("/dashboard"), GuardDecision::Wait);
    let state = h.runtime.bootstrap().await;

    assert_eq!(state, AuthState::Unauthenticated);
    assert_eq!(h.runtime.refresh_identity().await, None);
    assert_eq!(
        h.runtime.resolve_route("/dashboard").await,
        GuardDecision::Redirect("/".to_string())
    );

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_logout_invalidates_server_session() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();
    assert!(h.runtime.exchange_session(&token).await);

    h.runtime.logout().await;

    assert_eq!(h.runtime.cache().state(), AuthState::Unauthenticated);
    assert_eq!(h.backend.with_state(|s| s.sessions.len()), 0);
    assert_eq!(h.history.current().path(), "/");
    assert_eq!(h.notices.messages(), vec!["Logged out successfully".to_string()]);
    assert_eq!(h.runtime.refresh_identity().await, None);

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_logout_clears_locally_when_endpoint_fails() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();
    assert!(h.runtime.exchange_session(&token).await);
    h.backend.with_state(|s| s.fail_logout = true);

    h.runtime.logout().await;

    assert_eq!(h.runtime.cache().state(), AuthState::Unauthenticated);
    assert_eq!(
        h.runtime.guard("/settings"),
        GuardDecision::Redirect("/".to_string())
    );

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_backend_settles_unauthenticated() {
    // Nothing listens on the discard port
    let history = Arc::new(MemoryHistory::parse("http://localhost:3000/").unwrap());
    let runtime = AuthRuntime::new(
        ClientConfig::test_config("http://127.0.0.1:9"),
        history,
        Arc::new(NoticeLog::new()),
    )
    .unwrap();

    assert_eq!(runtime.bootstrap().await, AuthState::Unauthenticated);

    runtime.logout().await;
    assert_eq!(runtime.cache().state(), AuthState::Unauthenticated);
}

// ============================================================================
// Request layer
// ============================================================================

#[tokio::test]
async fn test_api_401_triggers_redirect_policy() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();
    assert!(h.runtime.exchange_session(&token).await);
    h.history.push("/finance");

    // Session revoked behind the client's back
    h.backend.with_state(|s| s.sessions.clear());
    let result: Result<serde_json::Value, AuthError> =
        h.runtime.api().get_json("/finance/summary").await;

    assert!(matches!(result, Err(AuthError::Unauthorized)));
    assert_eq!(h.runtime.cache().state(), AuthState::Unauthenticated);
    assert_eq!(h.history.current().path(), "/");
    assert!(h.notices.notices().is_empty());

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_api_success_with_session_cookie() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();
    assert!(h.runtime.exchange_session(&token).await);

    let summary: serde_json::Value = h
        .runtime
        .api()
        .get_json("/finance/summary")
        .await
        .expect("authenticated call should succeed");

    assert_eq!(summary["revenue"], 125000);

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_transient_fault_leaves_state_unchanged() {
    let h = harness("http://localhost:3000/").await;
    let token = SessionToken::new("abc123").unwrap();
    assert!(h.runtime.exchange_session(&token).await);
    let before = h.history.entries().len();

    let result: Result<serde_json::Value, AuthError> =
        h.runtime.api().get_json("/analytics/flaky").await;

    match result {
        Err(err @ AuthError::Status { status: 503, .. }) => assert!(err.is_retryable()),
        other => panic!("expected 503 status error, got {:?}", other),
    }
    assert_eq!(h.runtime.cache().state(), AuthState::Authenticated(ada()));
    assert_eq!(h.history.entries().len(), before);

    let notices = h.notices.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, REQUEST_FAILED_NOTICE);

    h.backend.shutdown().await;
}

#[tokio::test]
async fn test_noop_policy_does_not_navigate() {
    let h = harness("http://localhost:3000/finance").await;
    let api: ApiClient = h.runtime.api().with_policy(Arc::new(NoopPolicy));

    let result: Result<serde_json::Value, AuthError> = api.get_json("/finance/summary").await;

    assert!(matches!(result, Err(AuthError::Unauthorized)));
    assert_eq!(h.history.entries().len(), 1);
    assert_eq!(h.history.current().path(), "/finance");
    assert!(h.notices.notices().is_empty());

    h.backend.shutdown().await;
}
