//! Status bar — bottom line with session state and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use recommendli_core::dashboard::DashboardView;

use crate::theme::{C_ACCENT, C_ERROR, C_LOADING, C_MUTED, C_SECONDARY};

const KEYS: &str =
    " g generate  d dry run  i refresh index  r reload  o open  Tab/1-3 panes  ? help  q quit";

/// "● ada" when signed in, "○ signed out" after a rejected session.
fn session_span(view: &DashboardView) -> Span<'static> {
    match (&view.user.value, view.user.fetch_state.is_failed()) {
        (Some(user), _) => Span::styled(
            format!("● {}", user.display_name),
            Style::default().fg(C_ACCENT),
        ),
        (None, true) => Span::styled(
            "○ signed out (L to log in)",
            Style::default().fg(C_ERROR),
        ),
        (None, false) => Span::styled("○ connecting…", Style::default().fg(C_LOADING)),
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let mut spans = vec![Span::raw(" "), session_span(view)];
    if !view.visible {
        spans.push(Span::styled(
            "  paused",
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::ITALIC),
        ));
    }
    spans.push(Span::raw(" "));
    spans.push(Span::styled(KEYS, Style::default().fg(C_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
