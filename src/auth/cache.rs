/// Identity Cache
///
/// Single owner of "who is logged in". Consumers get snapshots or a `watch`
/// receiver; only the cache itself writes the state.
///
/// Every operation that changes the state advances an epoch. A refresh applies
/// its response only if no newer refresh, reset, logout or close happened while
/// it was in flight, so late responses never overwrite newer state.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::backend::AuthBackend;
use super::error::AuthError;
use super::identity::{AuthState, Identity};

pub struct IdentityCache {
    backend: Arc<dyn AuthBackend>,
    state: watch::Sender<AuthState>,
    epoch: AtomicU64,
    closed: AtomicBool,
}

impl IdentityCache {
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        Self {
            backend,
            state,
            epoch: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Current state snapshot
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Current identity, if authenticated
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until the first identity check has settled
    pub async fn wait_settled(&self) -> AuthState {
        let mut receiver = self.subscribe();
        match receiver.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    /// Ask the backend who is logged in and store the answer.
    ///
    /// Any failure settles to unauthenticated; nothing is returned as an error.
    pub async fn refresh_identity(&self) -> Option<Identity> {
        if self.is_closed() {
            debug!("Identity cache closed, skipping refresh");
            return None;
        }

        let epoch = self.advance_epoch();

        let identity = match self.backend.current_user().await {
            Ok(identity) => {
                info!(user_id = %identity.id, "Identity refreshed");
                Some(identity)
            }
            Err(AuthError::Unauthorized) => {
                debug!("Not authenticated");
                None
            }
            Err(e) => {
                warn!(error = %e, "Identity check failed, treating as unauthenticated");
                None
            }
        };

        if self.apply(epoch, AuthState::from(identity.clone())) {
            identity
        } else {
            debug!(epoch, "Discarding stale identity response");
            None
        }
    }

    /// Invalidate the server session and clear local state.
    ///
    /// Local state is cleared before the network call and stays cleared
    /// whatever the backend answers.
    pub async fn logout(&self) {
        self.reset();

        match self.backend.logout().await {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Server-side logout failed, local session cleared anyway"),
        }
    }

    /// Clear the identity without contacting the backend
    pub fn reset(&self) {
        self.advance_epoch();
        if self.is_closed() {
            return;
        }
        self.state.send_replace(AuthState::Unauthenticated);
    }

    /// Detach the cache from its owner; in-flight and later responses are dropped.
    ///
    /// A cache still loading settles to unauthenticated so waiters wake up.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.advance_epoch();
        self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = AuthState::Unauthenticated;
            true
        });
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn advance_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    // The epoch is compared while the watch lock is held, so a writer that
    // advanced the epoch either runs after this write or makes it a no-op.
    fn apply(&self, epoch: u64, next: AuthState) -> bool {
        self.state.send_if_modified(|state| {
            if self.closed.load(Ordering::SeqCst) || self.epoch.load(Ordering::SeqCst) != epoch {
                return false;
            }
            *state = next;
            true
        })
    }
}
