use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{info, warn};

/// Severity of a transient user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification shown to the user (a toast in the web client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

/// Sink for user-facing notices
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "notice"),
            NoticeLevel::Error => warn!(message = %notice.message, "notice"),
        }
    }
}

/// Keeps every notice in memory, in order
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
