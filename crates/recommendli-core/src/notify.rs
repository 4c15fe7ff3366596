//! Transient user-facing notifications (toasts).
//!
//! Shared between the dashboard loop, which reports outcomes of one-shot
//! actions, and the front-end, which renders and expires them.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub expires: Instant,
}

pub struct Notifications {
    queue: Mutex<VecDeque<Notification>>,
    max_visible: usize,
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            max_visible: 4,
        }
    }

    pub fn push(&self, message: impl Into<String>, severity: Severity, duration: Duration) {
        let message = message.into();
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        // Same message again just refreshes its expiry
        queue.retain(|n| n.message != message);
        queue.push_back(Notification {
            message,
            severity,
            expires: Instant::now() + duration,
        });
        while queue.len() > self.max_visible * 2 {
            queue.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(message, Severity::Warning, Duration::from_secs(4));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(5));
    }

    /// Remove expired notifications.  Returns `true` if any were removed.
    pub fn tick(&self) -> bool {
        let now = Instant::now();
        let mut queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        let before = queue.len();
        queue.retain(|n| n.expires > now);
        queue.len() != before
    }

    /// Newest first, at most `max_visible`.
    pub fn visible(&self) -> Vec<Notification> {
        let queue = self.queue.lock().unwrap_or_else(|e| e.into_inner());
        queue.iter().rev().take(self.max_visible).cloned().collect()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_collapse() {
        let n = Notifications::new();
        n.error("boom");
        n.error("boom");
        assert_eq!(n.visible().len(), 1);
    }

    #[test]
    fn newest_first_and_capped() {
        let n = Notifications::new();
        for i in 0..10 {
            n.info(format!("msg {i}"));
        }
        let visible = n.visible();
        assert_eq!(visible.len(), 4);
        assert_eq!(visible[0].message, "msg 9");
    }

    #[test]
    fn expired_are_dropped() {
        let n = Notifications::new();
        n.push("gone", Severity::Warning, Duration::ZERO);
        n.success("stays");
        assert!(n.tick());
        let visible = n.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].severity, Severity::Success);
    }
}
