//! Transient user-facing banners.

use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{error, info, warn};

/// Severity of a `Notice`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Identifier of a `Notice`, used to dismiss it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

/// A banner to be shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub level: Level,
    pub message: String,
    /// `None` for notices which stay until dismissed.
    pub expires_at: Option<Instant>,
}

/// The banners currently shown.
#[derive(Clone, Debug)]
pub struct Notices {
    ttl: Duration,
    next: u64,
    active: Vec<Notice>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NoticeOptions {
    /// How long transient notices stay, in milliseconds.
    pub ttl_ms: u64,
}

impl Default for NoticeOptions {
    fn default() -> Self {
        NoticeOptions { ttl_ms: 3000 }
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Notices {
            ttl,
            next: 0,
            active: Vec::new(),
        }
    }

    /// Shows a notice which goes away by itself once the time-to-live elapses.
    pub fn push(&mut self, level: Level, message: impl Into<String>) -> NoticeId {
        let expires_at = Instant::now() + self.ttl;
        self.insert(level, message.into(), Some(expires_at))
    }

    /// Shows a notice which stays until `dismiss`ed.
    pub fn push_sticky(&mut self, level: Level, message: impl Into<String>) -> NoticeId {
        self.insert(level, message.into(), None)
    }

    /// Removes a notice. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Drops the notices which have expired at `now`.
    pub fn expire(&mut self, now: Instant) {
        self.active
            .retain(|n| n.expires_at.map_or(true, |at| at > now));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.active.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn insert(&mut self, level: Level, message: String, expires_at: Option<Instant>) -> NoticeId {
        match level {
            Level::Info => info!(%message),
            Level::Warning => warn!(%message),
            Level::Error => error!(%message),
        }

        let id = NoticeId(self.next);
        self.next += 1;
        self.active.push(Notice {
            id,
            level,
            message,
            expires_at,
        });
        id
    }
}

impl Default for Notices {
    fn default() -> Self {
        Notices::new(Duration::from_millis(NoticeOptions::default().ttl_ms))
    }
}

impl From<NoticeOptions> for Notices {
    fn from(options: NoticeOptions) -> Self {
        Notices::new(Duration::from_millis(options.ttl_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_notices_expire() {
        let mut notices = Notices::new(Duration::from_secs(3));
        notices.push(Level::Warning, "Geocoder failed");
        let sticky = notices.push_sticky(Level::Warning, "offline");
        assert_eq!(notices.len(), 2);

        notices.expire(Instant::now());
        assert_eq!(notices.len(), 2);

        notices.expire(Instant::now() + Duration::from_secs(4));
        let left: Vec<_> = notices.iter().map(|n| n.id).collect();
        assert_eq!(left, [sticky]);

        assert!(notices.dismiss(sticky));
        assert!(!notices.dismiss(sticky));
        assert!(notices.is_empty());
    }
}
