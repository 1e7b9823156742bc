//! Coalescing refresh timer.
//!
//! Interactive panning asks the query layer for lazy answers only. Each
//! viewport change calls [`RefreshDebouncer::trigger`], which restarts a
//! single-shot timer; once input has been quiet for the configured delay the
//! callback runs once and typically issues the non-lazy fetch.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Default quiet period before a refresh runs.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(300);

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Single-shot timer restarted on every trigger.
pub struct RefreshDebouncer {
    runtime: Handle,
    delay: Duration,
    callback: Callback,
    pending: Option<JoinHandle<()>>,
}

impl RefreshDebouncer {
    /// Create a debouncer spawning its timer on `runtime`.
    pub fn new<C>(runtime: Handle, delay: Duration, callback: C) -> Self
    where
        C: Fn() + Send + Sync + 'static,
    {
        Self {
            runtime,
            delay,
            callback: Arc::new(callback),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Start the timer, replacing a pending one.
    pub fn trigger(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }

        let delay = self.delay;
        let callback = Arc::clone(&self.callback);
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::trace!(delay_ms = delay.as_millis() as u64, "Refresh timer fired");
            callback();
        }));
    }

    /// Drop a pending run.
    pub fn cancel(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }

    /// Returns true if a run is scheduled and has not happened yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for RefreshDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
