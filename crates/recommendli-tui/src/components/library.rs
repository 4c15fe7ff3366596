//! Library component — index summary and the preferences that drive
//! discovery generation.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use recommendli_core::dashboard::DashboardView;
use recommendli_proto::api::UserPreferences;

use crate::{
    action::{Action, ComponentId},
    component::Component,
    components::fetch_footer,
    theme::{style_default, style_secondary, C_LOADING, C_MUTED, C_PLAYLIST, C_STALE},
    widgets::pane_chrome::{pane_chrome, Badge},
};

const MAX_PLAYLIST_ROWS: usize = 8;

pub struct Library {
    /// Unsaved minimum album size, edited with +/-.
    draft_min_album: Option<u32>,
}

impl Library {
    pub fn new() -> Self {
        Self {
            draft_min_album: None,
        }
    }

    fn edit(&mut self, view: &DashboardView, delta: i64) {
        let Some(prefs) = view.preferences.value.as_ref() else {
            return;
        };
        let current = self.draft_min_album.unwrap_or(prefs.minimum_album_size);
        let next = (current as i64 + delta).clamp(1, 99) as u32;
        self.draft_min_album = (next != prefs.minimum_album_size).then_some(next);
    }

    fn pending_save(&self, view: &DashboardView) -> Option<UserPreferences> {
        let draft = self.draft_min_album?;
        let prefs = view.preferences.value.as_ref()?;
        Some(UserPreferences {
            minimum_album_size: draft,
            ..prefs.clone()
        })
    }

    fn index_lines(view: &DashboardView) -> Vec<Line<'static>> {
        let Some(summary) = view.index_summary.value.as_ref() else {
            return vec![Line::styled(
                " library index not loaded yet",
                Style::default().fg(C_MUTED),
            )];
        };
        let mut lines = vec![Line::from(vec![
            Span::styled(
                format!(" {} playlists", summary.playlist_count),
                style_default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} unique tracks", summary.unique_track_count),
                style_secondary(),
            ),
        ])];
        if view.index_summary.stale {
            lines.push(Line::styled(
                " out of date, refreshing…",
                Style::default().fg(C_STALE),
            ));
        }
        for playlist in summary.playlists.iter().take(MAX_PLAYLIST_ROWS) {
            lines.push(Line::styled(
                format!("   {}", playlist.name),
                Style::default().fg(C_PLAYLIST),
            ));
        }
        if summary.playlists.len() > MAX_PLAYLIST_ROWS {
            lines.push(Line::styled(
                format!("   … {} more", summary.playlists.len() - MAX_PLAYLIST_ROWS),
                Style::default().fg(C_MUTED),
            ));
        }
        lines
    }

    fn preference_lines(&self, view: &DashboardView) -> Vec<Line<'static>> {
        let Some(prefs) = view.preferences.value.as_ref() else {
            return vec![];
        };
        let mut lines = vec![
            Line::from(""),
            Line::styled(
                " preferences",
                Style::default().fg(C_MUTED).add_modifier(Modifier::BOLD),
            ),
            pref_row("library pattern", prefs.library_pattern.clone()),
            pref_row("discovery names", prefs.discovery_playlist_names.join(", ")),
        ];
        let min_album = match self.draft_min_album {
            Some(draft) => Line::from(vec![
                pref_span("min album size"),
                Span::styled(
                    format!("{} (unsaved, s to save)", draft),
                    Style::default().fg(C_LOADING),
                ),
            ]),
            None => pref_row(
                "min album size",
                format!("{}  (+/- to edit)", prefs.minimum_album_size),
            ),
        };
        lines.push(min_album);
        if !prefs.weighted_words.is_empty() {
            let words = prefs
                .weighted_words
                .iter()
                .map(|(w, n)| format!("{w}:{n}"))
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(pref_row("weighted words", words));
        }
        lines
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

fn pref_span(label: &str) -> Span<'static> {
    Span::styled(format!("   {:<16}", label), style_secondary())
}

fn pref_row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![pref_span(label), Span::styled(value, style_default())])
}

impl Component for Library {
    fn id(&self) -> ComponentId {
        ComponentId::Library
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Vec<Action> {
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.edit(view, 1);
                vec![]
            }
            KeyCode::Char('-') => {
                self.edit(view, -1);
                vec![]
            }
            KeyCode::Char('s') => self
                .pending_save(view)
                .map(|prefs| vec![Action::SavePreferences(prefs)])
                .unwrap_or_default(),
            KeyCode::Esc => {
                self.draft_min_album = None;
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _view: &DashboardView) {
        if let Action::SavePreferences(_) = action {
            self.draft_min_album = None;
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, view: &DashboardView) {
        let state = &view.index_summary.fetch_state;
        let badge = if view.index_summary.stale && !state.is_loading() {
            Badge {
                text: "stale",
                color: C_STALE,
            }
        } else {
            Badge::for_fetch(state)
        };
        let block = pane_chrome("library", Some('3'), focused, Some(badge));
        let block = match fetch_footer(state) {
            Some(footer) => block.title_bottom(footer),
            None => block,
        };

        let mut lines = Self::index_lines(view);
        lines.extend(self.preference_lines(view));
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
