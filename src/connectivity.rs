//! Offline detection and the bootstrap gate.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::notice::{Level, NoticeId, Notices};

const OFFLINE_MESSAGE: &str = "You are offline. The map will load once you are back online.";

/// A source of the current connectivity state.
pub trait Connectivity {
    fn is_online(&self) -> bool;
}

impl<F: Fn() -> bool> Connectivity for F {
    fn is_online(&self) -> bool {
        self()
    }
}

/// Keeps a single sticky banner up for as long as the application is offline.
#[derive(Clone, Debug, Default)]
pub struct OfflineBanner {
    shown: Option<NoticeId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectivityOptions {
    /// Delay between two connectivity polls during bootstrap, in milliseconds.
    pub retry_interval_ms: u64,
}

impl Default for ConnectivityOptions {
    fn default() -> Self {
        ConnectivityOptions {
            retry_interval_ms: 3000,
        }
    }
}

impl ConnectivityOptions {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl OfflineBanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows or dismisses the banner according to `online`.
    pub fn update(&mut self, online: bool, notices: &mut Notices) {
        match (online, self.shown) {
            (false, None) => {
                info!("connection lost");
                self.shown = Some(notices.push_sticky(Level::Warning, OFFLINE_MESSAGE));
            }
            (true, Some(id)) => {
                info!("connection restored");
                notices.dismiss(id);
                self.shown = None;
            }
            _ => {}
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }
}

/// Polls `conn` every `interval` until it reports being online.
///
/// While offline, an offline banner is kept in `notices`. `sleep` is called to wait
/// between two polls, which keeps this independent of any particular runtime.
/// Returns the number of polls that found the application offline.
pub async fn wait_until_online<C, S, F>(
    conn: &C,
    interval: Duration,
    notices: &mut Notices,
    mut sleep: S,
) -> u32
where
    C: Connectivity + ?Sized,
    S: FnMut(Duration) -> F,
    F: Future<Output = ()>,
{
    let mut banner = OfflineBanner::new();
    let mut failed = 0;
    loop {
        let online = conn.is_online();
        banner.update(online, notices);
        if online {
            return failed;
        }
        failed += 1;
        sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::executor::block_on;
    use futures::future;

    use super::*;

    #[test]
    fn banner_toggles_once() {
        let mut notices = Notices::default();
        let mut banner = OfflineBanner::new();

        banner.update(false, &mut notices);
        banner.update(false, &mut notices);
        assert_eq!(notices.len(), 1);
        assert!(banner.is_shown());

        banner.update(true, &mut notices);
        assert!(notices.is_empty());
        assert!(!banner.is_shown());
    }

    #[test]
    fn waits_for_connectivity() {
        let polls = Cell::new(0);
        let conn = || {
            polls.set(polls.get() + 1);
            polls.get() > 3
        };
        let slept = Cell::new(Duration::from_secs(0));
        let mut notices = Notices::default();

        let failed = block_on(wait_until_online(
            &conn,
            Duration::from_secs(3),
            &mut notices,
            |d| {
                slept.set(slept.get() + d);
                future::ready(())
            },
        ));

        assert_eq!(failed, 3);
        assert_eq!(slept.get(), Duration::from_secs(9));
        assert!(notices.is_empty());
    }

    #[test]
    fn online_at_once() {
        let mut notices = Notices::default();
        let failed = block_on(wait_until_online(
            &|| true,
            Duration::from_secs(3),
            &mut notices,
            |_| -> future::Ready<()> { panic!("slept while online") },
        ));
        assert_eq!(failed, 0);
    }
}
