//! App — terminal event loop.
//!
//! Architecture:
//! - `App` owns the pane components and the single `VisibilityWriter`.
//! - A blocking task reads crossterm events into an mpsc channel; focus
//!   events drive visibility, key events become `Action`s.
//! - Each frame renders a fresh `DashboardView`; the dashboard loop itself
//!   runs in its own task and is reached through `DashboardHandle`.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use recommendli_core::dashboard::{DashboardCommand, DashboardHandle, DashboardView};
use recommendli_core::notify::Notifications;
use recommendli_core::visibility::VisibilityWriter;

use crate::{
    action::{Action, ComponentId},
    browser::open_url,
    component::Component,
    components::{
        discovery::Discovery, help_overlay::HelpOverlay, library::Library,
        now_playing::NowPlaying,
    },
    theme::{C_ERROR, C_LOADING, C_MUTED},
    widgets::{status_bar::draw_keys_bar, toast::draw_toasts},
};

const PANES: [ComponentId; 3] = [
    ComponentId::NowPlaying,
    ComponentId::Discovery,
    ComponentId::Library,
];

pub struct App {
    handle: DashboardHandle,
    visibility: VisibilityWriter,
    notifications: Arc<Notifications>,
    login_url: String,

    now_playing: NowPlaying,
    discovery: Discovery,
    library: Library,
    help: HelpOverlay,

    focus: ComponentId,
    should_quit: bool,
}

impl App {
    pub fn new(
        handle: DashboardHandle,
        visibility: VisibilityWriter,
        notifications: Arc<Notifications>,
        login_url: String,
    ) -> Self {
        Self {
            handle,
            visibility,
            notifications,
            login_url,
            now_playing: NowPlaying::new(),
            discovery: Discovery::new(),
            library: Library::new(),
            help: HelpOverlay::new(),
            focus: ComponentId::NowPlaying,
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableFocusChange
        )?;
        terminal.show_cursor()?;

        if let Err(e) = self.handle.send(DashboardCommand::Shutdown).await {
            debug!("dashboard already stopped: {}", e);
        }
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(ev).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("terminal event stream ended: {}", e);
                    break;
                }
            }
        });

        // Redraw tick: resource changes land in the stores without waking us.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            let view = self.handle.view();
            self.sync(&view);
            terminal.draw(|f| self.draw(f, &view))?;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(ev) = rx.recv() => self.handle_event(ev, &view).await,
                _ = ui_tick.tick() => {
                    self.notifications.tick();
                }
            }
        }
        Ok(())
    }

    async fn handle_event(&mut self, ev: Event, view: &DashboardView) {
        match ev {
            Event::FocusGained => self.visibility.set_visible(true),
            Event::FocusLost => self.visibility.set_visible(false),
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                for action in self.handle_key(key, view) {
                    self.dispatch(action, view).await;
                }
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Vec<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }
        if self.help.visible {
            return self.help.handle_key(key, view);
        }
        if let Some(action) = global_action(key) {
            return vec![action];
        }
        match self.focus {
            ComponentId::NowPlaying => self.now_playing.handle_key(key, view),
            ComponentId::Discovery => self.discovery.handle_key(key, view),
            ComponentId::Library => self.library.handle_key(key, view),
            ComponentId::HelpOverlay => self.help.handle_key(key, view),
        }
    }

    async fn dispatch(&mut self, action: Action, view: &DashboardView) {
        debug!("dispatch: {:?}", action);
        let command = match &action {
            Action::GenerateDiscovery { dry_run } => Some(DashboardCommand::GenerateDiscovery {
                dry_run: *dry_run,
            }),
            Action::RefreshIndex => Some(DashboardCommand::RefreshIndex),
            Action::SavePreferences(prefs) => {
                Some(DashboardCommand::SavePreferences(prefs.clone()))
            }
            Action::Reload => {
                self.notifications.info("Reloading session");
                Some(DashboardCommand::Reload)
            }
            Action::Login => {
                let url = self.login_url.clone();
                self.open(&url);
                None
            }
            Action::OpenUrl(url) => {
                self.open(url);
                None
            }
            Action::FocusNext => {
                self.focus = cycle_focus(self.focus, true);
                None
            }
            Action::FocusPrev => {
                self.focus = cycle_focus(self.focus, false);
                None
            }
            Action::FocusPane(id) => {
                self.focus = *id;
                None
            }
            Action::Quit => {
                self.should_quit = true;
                None
            }
            Action::ToggleHelp
            | Action::SelectUp(_)
            | Action::SelectDown(_)
            | Action::SelectFirst
            | Action::SelectLast => None,
        };

        if let Some(command) = command {
            if let Err(e) = self.handle.send(command).await {
                error!("{:#}", e);
                self.notifications.error(e.to_string());
            }
        }

        // Components react to actions even when not focused.
        for component in self.components() {
            component.on_action(&action, view);
        }
    }

    fn open(&self, url: &str) {
        if let Err(e) = open_url(url) {
            warn!("{:#}", e);
            self.notifications.error(format!("{:#}", e));
        }
    }

    fn components(&mut self) -> [&mut dyn Component; 4] {
        [
            &mut self.now_playing,
            &mut self.discovery,
            &mut self.library,
            &mut self.help,
        ]
    }

    fn sync(&mut self, view: &DashboardView) {
        for component in self.components() {
            component.sync(view);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame, view: &DashboardView) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        if view.is_loading() {
            draw_loading(frame, rows[0], view);
        } else {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                .split(rows[0]);
            let left = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(columns[0]);

            let focus = self.focus;
            self.now_playing
                .draw(frame, left[0], focus == ComponentId::NowPlaying, view);
            self.library
                .draw(frame, left[1], focus == ComponentId::Library, view);
            self.discovery
                .draw(frame, columns[1], focus == ComponentId::Discovery, view);
        }

        draw_keys_bar(frame, rows[1], view);
        self.help.draw(frame, area, true, view);
        draw_toasts(frame, area, &self.notifications.visible());
    }
}

/// Keys that mean the same thing whichever pane has focus.
pub fn global_action(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Tab => Action::FocusNext,
        KeyCode::BackTab => Action::FocusPrev,
        KeyCode::Char('1') => Action::FocusPane(ComponentId::NowPlaying),
        KeyCode::Char('2') => Action::FocusPane(ComponentId::Discovery),
        KeyCode::Char('3') => Action::FocusPane(ComponentId::Library),
        KeyCode::Char('g') => Action::GenerateDiscovery { dry_run: false },
        KeyCode::Char('d') => Action::GenerateDiscovery { dry_run: true },
        KeyCode::Char('i') => Action::RefreshIndex,
        KeyCode::Char('r') => Action::Reload,
        KeyCode::Char('L') => Action::Login,
        _ => return None,
    };
    Some(action)
}

pub fn cycle_focus(current: ComponentId, forward: bool) -> ComponentId {
    let idx = PANES.iter().position(|&p| p == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % PANES.len()
    } else {
        (idx + PANES.len() - 1) % PANES.len()
    };
    PANES[next]
}

fn draw_loading(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let line = if view.user.fetch_state.is_failed() && view.user.value.is_none() {
        Line::styled(
            "waiting for login: finish in the browser, then press r",
            Style::default().fg(C_ERROR),
        )
    } else if view.user.value.is_some() && !view.visible {
        Line::styled(
            "paused while the terminal is in the background",
            Style::default().fg(C_MUTED),
        )
    } else {
        Line::styled("loading your dashboard…", Style::default().fg(C_LOADING))
    };
    let y = area.y + area.height / 2;
    let row = Rect {
        x: area.x,
        y,
        width: area.width,
        height: area.height.min(1),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), row);
}
