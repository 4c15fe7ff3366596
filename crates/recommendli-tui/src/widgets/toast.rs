//! Toast rendering for the shared notification queue.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use recommendli_core::notify::{Notification, Severity};

use crate::theme::severity_color;

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "·",
        Severity::Success => "✓",
        Severity::Warning => "!",
        Severity::Error => "✗",
    }
}

/// Render toasts stacked in the top-right corner of `area`, newest first.
pub fn draw_toasts(frame: &mut Frame, area: Rect, toasts: &[Notification]) {
    let max_width = (area.width / 2).clamp(30, 60).min(area.width);
    let mut y = area.y + 1;

    for toast in toasts {
        if y >= area.y + area.height {
            break;
        }
        let text = format!(" {} {} ", icon(toast.severity), toast.message);
        let w = (text.width() as u16).min(max_width);
        let x = area.x + area.width.saturating_sub(w + 1);
        let toast_area = Rect {
            x,
            y,
            width: w,
            height: 1,
        };
        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                text,
                Style::default()
                    .fg(severity_color(toast.severity))
                    .add_modifier(Modifier::BOLD),
            ))),
            toast_area,
        );
        y += 1;
    }
}
