//! Discovery component — the last generated discovery playlist.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use recommendli_core::dashboard::DashboardView;
use recommendli_proto::api::Track;

use crate::{
    action::{Action, ComponentId},
    component::Component,
    components::fetch_footer,
    theme::{
        style_accent, style_default, style_selected, style_selected_focused, C_LOADING, C_MUTED,
    },
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        scrollable_list::ScrollableList,
    },
};

pub struct Discovery {
    list: ScrollableList<Track>,
    /// (playlist id, snapshot id) of the rows currently shown.
    shown: Option<(String, String)>,
}

impl Discovery {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(),
            shown: None,
        }
    }
}

impl Default for Discovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Discovery {
    fn id(&self) -> ComponentId {
        ComponentId::Discovery
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Vec<Action> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => vec![Action::SelectUp(1)],
            KeyCode::Down | KeyCode::Char('j') => vec![Action::SelectDown(1)],
            KeyCode::PageUp => vec![Action::SelectUp(10)],
            KeyCode::PageDown => vec![Action::SelectDown(10)],
            KeyCode::Home => vec![Action::SelectFirst],
            KeyCode::End => vec![Action::SelectLast],
            KeyCode::Char('o') => {
                let track_url = self
                    .list
                    .selected_item()
                    .map(|t| t.external_urls.spotify.clone());
                let playlist_url = view
                    .discovery
                    .value
                    .as_ref()
                    .map(|p| p.external_urls.spotify.clone());
                track_url
                    .into_iter()
                    .chain(playlist_url)
                    .find(|url| !url.is_empty())
                    .map(|url| vec![Action::OpenUrl(url)])
                    .unwrap_or_default()
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _view: &DashboardView) {
        match action {
            Action::SelectUp(n) => self.list.select_up(*n),
            Action::SelectDown(n) => self.list.select_down(*n),
            Action::SelectFirst => self.list.select_first(),
            Action::SelectLast => self.list.select_last(),
            _ => {}
        }
    }

    fn sync(&mut self, view: &DashboardView) {
        let Some(playlist) = view.discovery.value.as_ref() else {
            return;
        };
        let key = (playlist.id.clone(), playlist.snapshot_id.clone());
        if self.shown.as_ref() != Some(&key) || self.list.len() != playlist.tracks.len() {
            self.list.set_items(playlist.tracks.clone());
            self.list.select_first();
            self.shown = Some(key);
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, view: &DashboardView) {
        let state = &view.discovery.fetch_state;
        let block = pane_chrome("discovery", Some('2'), focused, Some(Badge::for_fetch(state)));
        let block = match fetch_footer(state) {
            Some(footer) => block.title_bottom(footer),
            None => block,
        };
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(playlist) = view.discovery.value.as_ref() else {
            let hint = if state.is_loading() {
                Line::styled(" generating…", Style::default().fg(C_LOADING))
            } else {
                Line::styled(
                    " press g to generate a discovery playlist (d for a dry run)",
                    Style::default().fg(C_MUTED),
                )
            };
            frame.render_widget(Paragraph::new(hint), inner);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {}", playlist.name), style_accent()),
                Span::styled(
                    format!("  {} tracks", playlist.tracks.len()),
                    Style::default().fg(C_MUTED),
                ),
            ])),
            chunks[0],
        );

        let height = chunks[1].height as usize;
        self.list.ensure_visible(height);
        let selected = self.list.selected;
        let rows: Vec<Line> = self
            .list
            .visible_items(height)
            .into_iter()
            .map(|(i, track)| {
                let style = match (i == selected, focused) {
                    (true, true) => style_selected_focused(),
                    (true, false) => style_selected(),
                    _ => style_default(),
                };
                Line::styled(format!(" {:>3}  {}", i + 1, track.display()), style)
            })
            .collect();
        frame.render_widget(Paragraph::new(rows), chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::test_view;
    use recommendli_proto::api::{ExternalUrls, Playlist};

    fn playlist(urls: &[&str]) -> Playlist {
        Playlist {
            id: "pl".into(),
            name: "Discovery".into(),
            external_urls: ExternalUrls {
                spotify: "https://open.spotify.com/playlist/pl".into(),
            },
            tracks: urls
                .iter()
                .enumerate()
                .map(|(i, url)| Track {
                    id: format!("t{i}"),
                    name: format!("Song {i}"),
                    external_urls: ExternalUrls {
                        spotify: url.to_string(),
                    },
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn scroll_keys_become_selection_actions() {
        let mut d = Discovery::new();
        let view = test_view();
        let key = KeyEvent::from(KeyCode::Char('j'));
        assert_eq!(d.handle_key(key, &view), vec![Action::SelectDown(1)]);
        let key = KeyEvent::from(KeyCode::Char('o'));
        assert!(d.handle_key(key, &view).is_empty());
    }

    #[test]
    fn open_prefers_track_then_playlist() {
        let mut d = Discovery::new();
        let mut view = test_view();
        view.discovery.value = Some(playlist(&["https://t/0", ""]));
        d.sync(&view);
        assert_eq!(d.list.len(), 2);

        let open = KeyEvent::from(KeyCode::Char('o'));
        assert_eq!(
            d.handle_key(open, &view),
            vec![Action::OpenUrl("https://t/0".into())]
        );

        d.on_action(&Action::SelectDown(1), &view);
        assert_eq!(
            d.handle_key(open, &view),
            vec![Action::OpenUrl("https://open.spotify.com/playlist/pl".into())]
        );
    }

    #[test]
    fn new_playlist_resets_selection() {
        let mut d = Discovery::new();
        let mut view = test_view();
        view.discovery.value = Some(playlist(&["a", "b", "c"]));
        d.sync(&view);
        d.on_action(&Action::SelectLast, &view);

        let mut next = playlist(&["x", "y"]);
        next.snapshot_id = "s2".into();
        view.discovery.value = Some(next);
        d.sync(&view);
        assert_eq!(d.list.selected, 0);
        assert_eq!(d.list.len(), 2);
    }
}
