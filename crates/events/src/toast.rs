//! Transient operator notifications.
//!
//! [`ToastCenter`] holds the currently visible toasts in a
//! `tokio::sync::watch` channel, so a renderer always sees the latest
//! list. Every toast shown with a non-zero timeout gets a timer task that
//! dismisses it; dismissing by hand first makes the timer a no-op.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

/// Auto-dismiss timeout used when none is configured.
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_millis(7000);

/// Length of the random id handed out for each toast.
const TOAST_ID_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: String,
    pub text: String,
    pub kind: ToastKind,
}

/// Visible-toast list with timed dismissal. Clones share one list.
#[derive(Clone)]
pub struct ToastCenter {
    messages: Arc<watch::Sender<Vec<Toast>>>,
    timeout: Duration,
}

impl ToastCenter {
    /// `timeout` of zero keeps toasts until they are dismissed by hand.
    pub fn new(timeout: Duration) -> Self {
        let (messages, _) = watch::channel(Vec::new());
        Self {
            messages: Arc::new(messages),
            timeout,
        }
    }

    /// Show a toast and return its id.
    pub fn show(&self, text: impl Into<String>, kind: ToastKind) -> String {
        let text = text.into();
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(TOAST_ID_LEN);

        tracing::debug!(toast_id = %id, ?kind, text = %text, "Showing toast");
        let toast = Toast {
            id: id.clone(),
            text,
            kind,
        };
        self.messages.send_modify(|list| list.push(toast));

        if !self.timeout.is_zero() {
            self.schedule_dismissal(id.clone());
        }
        id
    }

    pub fn info(&self, text: impl Into<String>) -> String {
        self.show(text, ToastKind::Info)
    }

    pub fn success(&self, text: impl Into<String>) -> String {
        self.show(text, ToastKind::Success)
    }

    pub fn warning(&self, text: impl Into<String>) -> String {
        self.show(text, ToastKind::Warning)
    }

    pub fn error(&self, text: impl Into<String>) -> String {
        self.show(text, ToastKind::Error)
    }

    /// Remove one toast; unknown ids are ignored.
    pub fn dismiss(&self, id: &str) {
        dismiss_in(&self.messages, id);
    }

    /// Remove every toast.
    pub fn clear(&self) {
        self.messages.send_modify(Vec::clear);
    }

    /// Snapshot of the visible toasts, oldest first.
    pub fn messages(&self) -> Vec<Toast> {
        self.messages.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.messages.subscribe()
    }

    fn schedule_dismissal(&self, id: String) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(toast_id = %id, "No runtime for toast timer, toast stays until dismissed");
            return;
        };
        let messages = Arc::clone(&self.messages);
        let timeout = self.timeout;
        handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            dismiss_in(&messages, &id);
        });
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TIMEOUT)
    }
}

fn dismiss_in(messages: &watch::Sender<Vec<Toast>>, id: &str) {
    messages.send_if_modified(|list| {
        let before = list.len();
        list.retain(|t| t.id != id);
        list.len() != before
    });
}
