// ── Notification store ──
//
// Ordered list of transient user-facing messages. Timed entries own a
// cancellation token and a sleeping task that removes them on expiry;
// removing an entry by hand cancels its timer.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumIter};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Time until automatic removal. Zero means the entry stays until
    /// removed by hand.
    pub duration: Duration,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_persistent(&self) -> bool {
        self.duration.is_zero()
    }
}

/// Request to show a notification. `duration: None` takes the store default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub duration: Option<Duration>,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            duration: None,
        }
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Oldest entries are dropped once more than this many are active.
    pub max_visible: usize,
    pub default_duration: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_visible: 5,
            default_duration: Duration::from_millis(5000),
        }
    }
}

struct Active {
    notification: Notification,
    timer: Option<CancellationToken>,
}

struct Inner {
    config: NotificationConfig,
    active: Mutex<Vec<Active>>,
    snapshot: watch::Sender<Arc<Vec<Notification>>>,
    shutdown: CancellationToken,
}

/// Shared handle to the active notifications. Clones share state.
///
/// Adding a timed notification spawns a tokio task, so it must be called
/// from within a runtime.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for NotificationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationStore")
            .field("active", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(NotificationConfig::default())
    }
}

impl NotificationStore {
    pub fn new(config: NotificationConfig) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(Inner {
                config,
                active: Mutex::new(Vec::new()),
                snapshot,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn add(&self, new: NewNotification) -> NotificationId {
        let id = NotificationId::new();
        // no timers run after shutdown, so late entries are persistent
        let duration = if self.inner.shutdown.is_cancelled() {
            Duration::ZERO
        } else {
            new.duration.unwrap_or(self.inner.config.default_duration)
        };
        let timer = (!duration.is_zero()).then(|| self.inner.shutdown.child_token());

        let notification = Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            duration,
            created_at: Utc::now(),
        };
        trace!(%id, kind = %notification.kind, "notification added");

        {
            let mut active = self.lock();
            active.push(Active {
                notification,
                timer: timer.clone(),
            });
            let excess = active.len().saturating_sub(self.inner.config.max_visible.max(1));
            for dropped in active.drain(..excess) {
                if let Some(token) = dropped.timer {
                    token.cancel();
                }
            }
            self.publish(&active);
        }

        if let Some(token) = timer {
            let store = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {}
                    () = tokio::time::sleep(duration) => {
                        store.remove(id);
                    }
                }
            });
        }

        id
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Success, title, message))
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Error, title, message))
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Warning, title, message))
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Info, title, message))
    }

    pub fn success_for(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Success, title, message).duration(duration))
    }

    pub fn error_for(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Error, title, message).duration(duration))
    }

    pub fn warning_for(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Warning, title, message).duration(duration))
    }

    pub fn info_for(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> NotificationId {
        self.add(NewNotification::new(NotificationKind::Info, title, message).duration(duration))
    }

    /// Remove one entry. Returns `false` if it was already gone.
    pub fn remove(&self, id: NotificationId) -> bool {
        let mut active = self.lock();
        let Some(pos) = active.iter().position(|a| a.notification.id == id) else {
            return false;
        };
        let removed = active.remove(pos);
        if let Some(token) = removed.timer {
            token.cancel();
        }
        self.publish(&active);
        trace!(%id, "notification removed");
        true
    }

    pub fn clear(&self) {
        let mut active = self.lock();
        for entry in active.drain(..) {
            if let Some(token) = entry.timer {
                token.cancel();
            }
        }
        self.publish(&active);
    }

    /// Cancel every pending timer. Entries already shown stay in place.
    ///
    /// Shutdown is terminal: anything added afterwards is persistent and
    /// stays until removed by hand.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    pub fn snapshot(&self) -> Arc<Vec<Notification>> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Notification>>> {
        self.inner.snapshot.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Active>> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, active: &[Active]) {
        let list: Vec<Notification> = active.iter().map(|a| a.notification.clone()).collect();
        self.inner.snapshot.send_replace(Arc::new(list));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[tokio::test(start_paused = true)]
    async fn default_duration_expires_after_five_seconds() {
        let store = NotificationStore::default();
        let id = store.success("Saved", "Provider created");
        assert_eq!(store.snapshot()[0].duration, Duration::from_millis(5000));

        tokio::time::sleep(4999 * MS).await;
        assert_eq!(store.snapshot().len(), 1);

        tokio::time::sleep(2 * MS).await;
        assert!(store.snapshot().is_empty());
        assert!(!store.remove(id));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_is_persistent() {
        let store = NotificationStore::default();
        store.error_for("Error", "stays", Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(600)).await;
        let active = store.snapshot();
        assert_eq!(active.len(), 1);
        assert!(active[0].is_persistent());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_removal_cancels_timer() {
        let store = NotificationStore::default();
        let first = store.info("a", "first");
        let second = store.info("b", "second");

        assert!(store.remove(first));
        assert!(!store.remove(first));
        assert_eq!(store.snapshot()[0].id, second);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn ordering_and_cap() {
        let store = NotificationStore::new(NotificationConfig {
            max_visible: 3,
            ..NotificationConfig::default()
        });
        let ids: Vec<NotificationId> = (0..4).map(|i| store.warning("w", format!("{i}"))).collect();

        let active = store.snapshot();
        let shown: Vec<NotificationId> = active.iter().map(|n| n.id).collect();
        assert_eq!(shown, ids[1..].to_vec());
        assert!(!store.remove(ids[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_changes() {
        let store = NotificationStore::default();
        let mut rx = store.subscribe();
        rx.borrow_and_update();

        store.success_for("ok", "done", 100 * MS);
        rx.changed().await.ok();
        assert_eq!(rx.borrow_and_update().len(), 1);

        rx.changed().await.ok();
        assert!(rx.borrow().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_expiry() {
        let store = NotificationStore::default();
        store.info("i", "pending");
        store.shutdown();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(store.snapshot().len(), 1);

        store.clear();
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn adds_after_shutdown_are_persistent() {
        let store = NotificationStore::default();
        store.shutdown();
        let id = store.success("Success", "late");

        let active = store.snapshot();
        assert!(active[0].is_persistent());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.snapshot().len(), 1);
        assert!(store.remove(id));
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(NotificationKind::Warning.to_string(), "warning");
    }
}
