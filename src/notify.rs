use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    created_at: Instant,
}

impl Notification {
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}

/// Wire shape of a queued notification; timestamps stay process-internal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveNotification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

impl From<&Notification> for ActiveNotification {
    fn from(value: &Notification) -> Self {
        Self {
            id: value.id,
            kind: value.kind,
            message: value.message.clone(),
        }
    }
}

struct Inner {
    queue: VecDeque<Notification>,
    subscribers: Vec<Sender<Notification>>,
    next_id: u64,
}

/// Single owner of the toast/notification queue.
///
/// Bounded FIFO: when the queue is full the oldest entry is evicted. A
/// publish whose (kind, message) pair already sits in the queue within the
/// de-dupe window is swallowed. Items expire after `ttl` and are pruned on
/// observation rather than by a background timer; `now` is a parameter on the
/// `_at` variants so expiry and de-dupe are deterministic under test.
pub struct NotificationCenter {
    inner: Mutex<Inner>,
    capacity: usize,
    dedupe_window: Duration,
    ttl: Duration,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(32, Duration::from_secs(2), Duration::from_secs(6))
    }
}

impl NotificationCenter {
    pub fn new(capacity: usize, dedupe_window: Duration, ttl: Duration) -> Self {
        assert!(capacity > 0, "notification queue capacity must be positive");
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::with_capacity(capacity),
                subscribers: Vec::new(),
                next_id: 0,
            }),
            capacity,
            dedupe_window,
            ttl,
        }
    }

    /// Queue a notification and fan it out to subscribers. Returns false when
    /// it was swallowed as a duplicate.
    pub fn publish(&self, kind: NotificationKind, message: impl Into<String>) -> bool {
        self.publish_at(kind, message, Instant::now())
    }

    pub fn publish_at(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Instant,
    ) -> bool {
        let message = message.into();
        let mut inner = self.inner.lock().expect("notification mutex poisoned");
        Self::prune(&mut inner.queue, now, self.ttl);

        let duplicate = inner.queue.iter().any(|n| {
            n.kind == kind
                && n.message == message
                && now.duration_since(n.created_at) <= self.dedupe_window
        });
        if duplicate {
            return false;
        }

        if inner.queue.len() == self.capacity {
            inner.queue.pop_front();
        }

        inner.next_id += 1;
        let notification = Notification {
            id: inner.next_id,
            kind,
            message,
            created_at: now,
        };
        inner.queue.push_back(notification.clone());
        inner
            .subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
        true
    }

    /// Register a subscriber; dropped receivers are cleaned up on the next
    /// publish.
    pub fn subscribe(&self) -> Receiver<Notification> {
        let (tx, rx) = channel();
        self.inner
            .lock()
            .expect("notification mutex poisoned")
            .subscribers
            .push(tx);
        rx
    }

    pub fn active(&self) -> Vec<ActiveNotification> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Vec<ActiveNotification> {
        let mut inner = self.inner.lock().expect("notification mutex poisoned");
        Self::prune(&mut inner.queue, now, self.ttl);
        inner.queue.iter().map(ActiveNotification::from).collect()
    }

    /// Drop a notification before its timer runs out. Returns false when the
    /// id is not queued.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().expect("notification mutex poisoned");
        let before = inner.queue.len();
        inner.queue.retain(|n| n.id != id);
        inner.queue.len() != before
    }

    fn prune(queue: &mut VecDeque<Notification>, now: Instant, ttl: Duration) {
        queue.retain(|n| now.duration_since(n.created_at) < ttl);
    }
}
