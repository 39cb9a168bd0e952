//! The background notification poll.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default time between notification polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

struct PollHandle {
    user_id: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns at most one polling loop.
///
/// The loop polls immediately, then once per interval, until [`stop`] is
/// called or the poller is dropped.  Polls are independent reads; a slow one
/// delays the next tick rather than overlapping it.
///
/// [`stop`]: NotificationPoller::stop
pub struct NotificationPoller {
    interval: Duration,
    handle: Mutex<Option<PollHandle>>,
}

impl NotificationPoller {
    /// Creates a stopped poller.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: Mutex::new(None),
        }
    }

    /// Time between polls.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling for `user_id`, calling `poll` on every tick.
    ///
    /// Returns false and does nothing if a loop is already running.
    pub fn start<F, Fut>(&self, user_id: u64, poll: F) -> bool
    where
        F: Fn(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if handle.as_ref().is_some_and(|h| !h.task.is_finished()) {
            tracing::debug!(user_id, "notification poller already running");
            return false;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = self.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => poll(user_id).await,
                }
            }
            tracing::debug!(user_id, "notification poller stopped");
        });
        tracing::info!(user_id, interval_secs = period.as_secs_f64(), "notification poller started");
        *handle = Some(PollHandle {
            user_id,
            cancel,
            task,
        });
        true
    }

    /// Stops the loop.  Returns false if none was running.
    pub fn stop(&self) -> bool {
        let handle = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        match handle {
            Some(handle) => {
                handle.cancel.cancel();
                !handle.task.is_finished()
            }
            None => false,
        }
    }

    /// Returns true while a loop is running.
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.task.is_finished())
    }

    /// The user the running loop polls for.
    pub fn user_id(&self) -> Option<u64> {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|h| h.user_id)
    }
}

impl Default for NotificationPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().unwrap_or_else(|e| e.into_inner()).take() {
            handle.cancel.cancel();
        }
    }
}
