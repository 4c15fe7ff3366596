//! NowPlaying component — the current track and whether it is in the library.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use recommendli_core::dashboard::DashboardView;

use crate::{
    action::{Action, ComponentId},
    component::Component,
    components::fetch_footer,
    theme::{style_default, style_secondary, C_ERROR, C_LOADING, C_MUTED, C_PLAYING, C_PLAYLIST},
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct NowPlaying;

impl NowPlaying {
    pub fn new() -> Self {
        Self
    }

    fn lines(view: &DashboardView) -> Vec<Line<'static>> {
        let Some(track) = view.now_playing() else {
            return vec![Line::styled(" nothing playing", Style::default().fg(C_MUTED))];
        };

        let mut lines = vec![
            Line::styled(
                format!(" {}", track.name),
                style_default().add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                format!(
                    " {}",
                    track
                        .artists
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                style_secondary(),
            ),
        ];
        if !track.album.name.is_empty() {
            lines.push(Line::styled(
                format!(" {}", track.album.name),
                Style::default().fg(C_MUTED),
            ));
        }
        lines.push(Line::from(""));
        lines.push(if view.is_playing() {
            Line::styled(" ▶ playing", Style::default().fg(C_PLAYING))
        } else {
            Line::styled(" ❚❚ paused", Style::default().fg(C_MUTED))
        });

        match view.current_status() {
            Some(status) if status.in_library => {
                lines.push(Line::styled(
                    " ✓ in your library",
                    Style::default().fg(C_PLAYING),
                ));
                for playlist in &status.playlists {
                    lines.push(Line::from(vec![
                        Span::raw("   "),
                        Span::styled(playlist.name.clone(), Style::default().fg(C_PLAYLIST)),
                    ]));
                }
            }
            Some(_) => lines.push(Line::styled(
                " ✗ not in your library",
                Style::default().fg(C_LOADING),
            )),
            None if view.track_status.is_loading() => lines.push(Line::styled(
                " checking library…",
                Style::default().fg(C_MUTED),
            )),
            None if view.track_status.fetch_state.is_failed() => lines.push(Line::styled(
                " library check failed",
                Style::default().fg(C_ERROR),
            )),
            None => {}
        }
        lines
    }
}

impl Default for NowPlaying {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for NowPlaying {
    fn id(&self) -> ComponentId {
        ComponentId::NowPlaying
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Vec<Action> {
        match key.code {
            KeyCode::Char('o') => view
                .now_playing()
                .map(|t| t.external_urls.spotify.clone())
                .filter(|url| !url.is_empty())
                .map(|url| vec![Action::OpenUrl(url)])
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, view: &DashboardView) {
        let block = pane_chrome(
            "now playing",
            Some('1'),
            focused,
            Some(Badge::for_fetch(&view.current_track.fetch_state)),
        );
        let block = match fetch_footer(&view.current_track.fetch_state) {
            Some(footer) => block.title_bottom(footer),
            None => block,
        };
        frame.render_widget(
            Paragraph::new(Self::lines(view))
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
    }
}
