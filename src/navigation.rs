//! Navigation
//!
//! The browser history as seen by the session client: read the current
//! location, replace the current entry, or push a new one.

use std::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::auth::AuthError;

pub trait History: Send + Sync {
    /// Current addressable location
    fn current(&self) -> Url;

    /// Replace the current entry with `path` (same origin)
    fn replace(&self, path: &str);

    /// Navigate to `path` as a new entry
    fn push(&self, path: &str);
}

/// In-process history stack
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Vec<Url>>,
}

impl MemoryHistory {
    pub fn new(initial: Url) -> Self {
        Self {
            entries: Mutex::new(vec![initial]),
        }
    }

    pub fn parse(initial: &str) -> Result<Self, AuthError> {
        Ok(Self::new(Url::parse(initial)?))
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Vec<Url> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Url>> {
        match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn resolve(current: &Url, path: &str) -> Option<Url> {
        match current.join(path) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(path, error = %e, "Ignoring navigation to unparsable path");
                None
            }
        }
    }
}

impl History for MemoryHistory {
    fn current(&self) -> Url {
        let entries = self.lock();
        // Never empty: constructed with one entry and only ever grows
        entries[entries.len() - 1].clone()
    }

    fn replace(&self, path: &str) {
        let mut entries = self.lock();
        let last = entries.len() - 1;
        if let Some(url) = Self::resolve(&entries[last], path) {
            debug!(path, "history.replace");
            entries[last] = url;
        }
    }

    fn push(&self, path: &str) {
        let mut entries = self.lock();
        let last = entries.len() - 1;
        if let Some(url) = Self::resolve(&entries[last], path) {
            debug!(path, "history.push");
            entries.push(url);
        }
    }
}
