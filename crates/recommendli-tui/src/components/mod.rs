pub mod discovery;
pub mod help_overlay;
pub mod library;
pub mod now_playing;

use chrono::{DateTime, Utc};
use ratatui::{style::Style, text::Line};

use recommendli_core::fetch_state::FetchState;

use crate::theme::{C_ERROR, C_MUTED};

/// "just now", "42s ago", "3m ago", "2h ago".
pub fn ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{}s ago", secs),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h ago", secs / 3600),
    }
}

/// Footer line for a pane: the last error if the latest attempt failed,
/// otherwise when the value was last refreshed.
pub fn fetch_footer(state: &FetchState) -> Option<Line<'static>> {
    if let (true, Some(err)) = (state.is_failed(), state.last_error.as_ref()) {
        return Some(Line::styled(
            format!(" {}", err),
            Style::default().fg(C_ERROR),
        ));
    }
    state.last_completed_at.map(|at| {
        Line::styled(
            format!(" updated {}", ago(at, Utc::now())),
            Style::default().fg(C_MUTED),
        )
    })
}

/// Every resource empty and never fetched.
#[cfg(test)]
pub(crate) fn test_view() -> recommendli_core::dashboard::DashboardView {
    use recommendli_core::resource::Resource;
    recommendli_core::dashboard::DashboardView {
        visible: true,
        user: Resource::new("user").snapshot(),
        current_track: Resource::new("current-track").snapshot(),
        track_status: Resource::new("track-status").snapshot(),
        index_summary: Resource::new("index-summary").snapshot(),
        discovery: Resource::new("discovery-playlist").snapshot(),
        preferences: Resource::new("user-preferences").snapshot(),
    }
}
