//! Auto-dismissing notification channel.
//!
//! At most one notification is visible. Showing a new one replaces the
//! current one and re-arms the dismissal timer; a timer armed for an older
//! notification never dismisses a newer one.

use care_shared::Notification;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

/// Default dismissal window
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(3000);

/// A visible notification and its arming id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shown {
    pub id: u64,
    pub notification: Notification,
}

struct Inner {
    tx: watch::Sender<Option<Shown>>,
    next_id: AtomicU64,
    dismiss_after: Duration,
}

#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    pub fn new(dismiss_after: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner { tx, next_id: AtomicU64::new(0), dismiss_after }),
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.inner.dismiss_after
    }

    /// Show `notification`, replacing whatever is visible. Returns its id.
    pub fn show(&self, notification: Notification) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Notification {} ({}): {}", id, notification.severity, notification.message);
        self.inner.tx.send_replace(Some(Shown { id, notification }));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let this = self.clone();
                let delay = self.inner.dismiss_after;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    this.dismiss(id);
                });
            }
            Err(_) => debug!("No runtime; notification {} stays until replaced", id),
        }
        id
    }

    /// Dismiss notification `id` if it is still the visible one.
    pub fn dismiss(&self, id: u64) -> bool {
        let dismissed = self.inner.tx.send_if_modified(|current| match current {
            Some(shown) if shown.id == id => {
                *current = None;
                true
            }
            _ => false,
        });
        if dismissed {
            debug!("Notification {} dismissed", id);
        }
        dismissed
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.tx.borrow().as_ref().map(|s| s.notification.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Shown>> {
        self.inner.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}
