//! Mutation observer for ReviewBadge.
//!
//! Watches a document's mutation counter and re-runs a scan once the page has
//! been quiet for the debounce delay.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Quiet period after the last mutation before a rescan runs.
pub const RESCAN_DELAY: Duration = Duration::from_millis(500);

/// Cancel-and-reschedule timer. At most one scheduled action is pending.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Drops any pending action and schedules `action` after the delay.
    /// Must run inside a tokio runtime.
    pub fn schedule<F>(&mut self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns the observer loop.
///
/// Every change on `mutations` reschedules `rescan`, so a burst of changes
/// produces one call. The loop ends when the document is dropped; aborting the
/// returned handle also cancels a pending rescan.
pub fn spawn_observer<F>(mut mutations: watch::Receiver<u64>, delay: Duration, rescan: F) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let rescan = Arc::new(rescan);
    tokio::spawn(async move {
        let mut debouncer = Debouncer::new(delay);
        while mutations.changed().await.is_ok() {
            let rescan = Arc::clone(&rescan);
            debouncer.schedule(move || (*rescan)());
        }
        log::debug!("document dropped, observer stopping");
    })
}
