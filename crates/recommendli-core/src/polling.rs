//! Interval polling that only runs while it is switched on.
//!
//! A controller is either inactive (no task, no timer) or active (exactly one
//! loop task with its own cancellation token).  Activation runs the action
//! right away; the next run starts `interval` after the previous one
//! *started*, so a slow response shortens the gap but never makes runs
//! overlap.  Deactivation cancels the pending wait immediately.  A run already
//! in flight is left to finish; its result goes through the resource's normal
//! staleness check.  A refresh cuts the current wait short, or queues one
//! extra run if a run is in flight.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type PollAction = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct ActiveLoop {
    cancel: CancellationToken,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

pub struct PollingController {
    name: &'static str,
    interval: Duration,
    action: PollAction,
    active: Option<ActiveLoop>,
}

impl PollingController {
    pub fn new<F, Fut>(name: &'static str, interval: Duration, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let action: PollAction = Arc::new(move || action().boxed());
        Self {
            name,
            interval,
            action,
            active: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn set_active(&mut self, active: bool) {
        if active {
            self.activate();
        } else {
            self.deactivate();
        }
    }

    /// No-op when already active.
    pub fn activate(&mut self) {
        if self.active.is_some() {
            return;
        }
        debug!(poller = self.name, "activating (every {:?})", self.interval);
        let cancel = CancellationToken::new();
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(run_loop(
            self.name,
            self.interval,
            Arc::clone(&self.action),
            cancel.clone(),
            Arc::clone(&wake),
        ));
        self.active = Some(ActiveLoop { cancel, wake, task });
    }

    /// No-op when already inactive.
    pub fn deactivate(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(poller = self.name, "deactivating");
            active.cancel.cancel();
        }
    }

    /// Run again as soon as no run is in flight; the schedule restarts from
    /// there.  Repeated calls before that run starts collapse into one.  Does
    /// nothing while inactive, since the next activation runs immediately
    /// anyway.
    pub fn refresh(&self) {
        if let Some(active) = &self.active {
            debug!(poller = self.name, "refreshing");
            active.wake.notify_one();
        }
    }

    /// Deactivate and wait for the loop task to exit, including any run
    /// that was in flight.
    pub async fn shutdown(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            let _ = active.task.await;
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.deactivate();
    }
}

async fn run_loop(
    name: &'static str,
    interval: Duration,
    action: PollAction,
    cancel: CancellationToken,
    wake: Arc<Notify>,
) {
    loop {
        // Activation may have been undone before this task got scheduled.
        if cancel.is_cancelled() {
            break;
        }

        let started = Instant::now();
        action().await;

        let delay = interval.saturating_sub(started.elapsed());
        debug!(poller = name, "sleeping for {:?}", delay);

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = wake.notified() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
    debug!(poller = name, "stopped");
}
