//! Is the dashboard currently visible to the user?
//!
//! One [`VisibilityWriter`] exists per tracker and it is owned by the single
//! platform subscription (terminal focus events in the TUI).  Everything else
//! holds read-only [`VisibilityTracker`] clones.

use tokio::sync::watch;
use tracing::debug;

pub fn visibility(initially_visible: bool) -> (VisibilityWriter, VisibilityTracker) {
    let (tx, rx) = watch::channel(initially_visible);
    (VisibilityWriter { tx }, VisibilityTracker { rx })
}

pub struct VisibilityWriter {
    tx: watch::Sender<bool>,
}

impl VisibilityWriter {
    pub fn set_visible(&self, visible: bool) {
        let changed = self.tx.send_if_modified(|current| {
            let changed = *current != visible;
            *current = visible;
            changed
        });
        if changed {
            debug!("visibility -> {}", if visible { "visible" } else { "hidden" });
        }
    }
}

#[derive(Clone)]
pub struct VisibilityTracker {
    rx: watch::Receiver<bool>,
}

impl VisibilityTracker {
    pub fn is_visible(&self) -> bool {
        *self.rx.borrow()
    }

    /// A receiver that only wakes for changes made after this call.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        let mut rx = self.rx.clone();
        rx.borrow_and_update();
        rx
    }
}
