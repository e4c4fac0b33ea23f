//! Transient status notices.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::sync::{broadcast, Mutex};
use tracing::debug;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeEvent {
    Posted(Notice),
    Expired(NoticeId),
    Dismissed(NoticeId),
}

/// Status area holding notices that expire on their own.
///
/// Every notice is removed after the board's ttl, independent of the
/// others. Posting must happen inside a Tokio runtime.
#[derive(Clone)]
pub struct StatusBoard {
    inner: Arc<StatusBoardInner>,
}

struct StatusBoardInner {
    ttl: Duration,
    next_id: AtomicU64,
    active: Mutex<Vec<Notice>>,
    events: broadcast::Sender<NoticeEvent>,
}

impl StatusBoardInner {
    async fn remove(&self, id: NoticeId) -> bool {
        let mut active = self.active.lock().await;
        let before = active.len();
        active.retain(|notice| notice.id != id);
        active.len() != before
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl StatusBoard {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(StatusBoardInner {
                ttl,
                next_id: AtomicU64::new(1),
                active: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    pub async fn post(&self, kind: NoticeKind, text: impl Into<String>) -> NoticeId {
        let notice = Notice {
            id: NoticeId(self.inner.next_id.fetch_add(1, Ordering::Relaxed)),
            kind,
            text: text.into(),
        };
        let id = notice.id;
        debug!(notice_id = id.0, kind = kind.as_str(), text = %notice.text, "status notice posted");

        self.inner.active.lock().await.push(notice.clone());
        let _ = self.inner.events.send(NoticeEvent::Posted(notice));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(inner.ttl).await;
            if inner.remove(id).await {
                let _ = inner.events.send(NoticeEvent::Expired(id));
            }
        });

        id
    }

    /// Removes a notice before its ttl runs out. Returns false when it is
    /// already gone.
    pub async fn dismiss(&self, id: NoticeId) -> bool {
        let removed = self.inner.remove(id).await;
        if removed {
            debug!(notice_id = id.0, "status notice dismissed");
            let _ = self.inner.events.send(NoticeEvent::Dismissed(id));
        }
        removed
    }

    /// Notices currently on display, oldest first.
    pub async fn active(&self) -> Vec<Notice> {
        self.inner.active.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NoticeEvent> {
        self.inner.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
