//! Lifecycle of one resource's fetch attempts.
//!
//! ```text
//!  NotStarted ──► Loading ──► Idle
//!                   ▲  │
//!                   │  └────► Failed
//!                   └─────────┘ (next attempt)
//! ```
//!
//! `NotStarted` is only ever observed before the first attempt begins.

use chrono::{DateTime, Utc};
use recommendli_proto::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    NotStarted,
    Loading,
    Idle,
    Failed,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "new",
            Self::Loading => "loading",
            Self::Idle => "idle",
            Self::Failed => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchState {
    pub phase: Phase,
    /// When the last attempt finished, successfully or not.
    pub last_completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<ApiError>,
}

impl FetchState {
    pub fn initial() -> Self {
        Self::default()
    }

    /// Keeps the previous timestamp and error visible while the refresh runs.
    pub fn loading(&self) -> Self {
        Self {
            phase: Phase::Loading,
            ..self.clone()
        }
    }

    pub fn succeeded(&self, at: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Idle,
            last_completed_at: Some(at),
            last_error: None,
        }
    }

    pub fn failed(&self, error: ApiError, at: DateTime<Utc>) -> Self {
        Self {
            phase: Phase::Failed,
            last_completed_at: Some(at),
            last_error: Some(error),
        }
    }

    /// At least one attempt has completed: there is something to show, even
    /// if it is an error.
    pub fn is_ready(&self) -> bool {
        self.phase != Phase::NotStarted && self.last_completed_at.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_is_not_ready() {
        let fs = FetchState::initial();
        assert_eq!(fs.phase, Phase::NotStarted);
        assert!(fs.last_completed_at.is_none());
        assert!(!fs.is_ready());
    }

    #[test]
    fn first_loading_is_not_ready() {
        let fs = FetchState::initial().loading();
        assert!(fs.is_loading());
        assert!(!fs.is_ready());
    }

    #[test]
    fn failure_counts_as_ready() {
        let now = Utc::now();
        let fs = FetchState::initial()
            .loading()
            .failed(ApiError::Transport("connection refused".into()), now);
        assert!(fs.is_ready());
        assert!(fs.is_failed());
        assert_eq!(fs.last_completed_at, Some(now));
    }

    #[test]
    fn refresh_keeps_previous_completion() {
        let first = Utc::now();
        let fs = FetchState::initial().loading().succeeded(first).loading();
        assert!(fs.is_loading());
        assert!(fs.is_ready());
        assert_eq!(fs.last_completed_at, Some(first));
    }

    #[test]
    fn success_clears_error() {
        let now = Utc::now();
        let fs = FetchState::initial()
            .loading()
            .failed(ApiError::Decode("eof".into()), now)
            .loading();
        assert!(fs.last_error.is_some());
        let fs = fs.succeeded(now);
        assert_eq!(fs.phase, Phase::Idle);
        assert!(fs.last_error.is_none());
    }
}
