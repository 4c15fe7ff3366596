//! Component trait — the interface every UI panel implements.
//!
//! Components own their own UI state (selection, drafts) and read resource
//! data from the latest [`DashboardView`].  They never talk to the dashboard
//! directly: they return `Vec<Action>` and the App dispatches them.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use recommendli_core::dashboard::DashboardView;

use crate::action::{Action, ComponentId};

pub trait Component {
    fn id(&self) -> ComponentId;

    /// Only called when this component has focus.
    fn handle_key(&mut self, key: KeyEvent, view: &DashboardView) -> Vec<Action>;

    /// Receive an action dispatched by the App, focused or not.
    fn on_action(&mut self, _action: &Action, _view: &DashboardView) {}

    /// Called whenever a fresh view has been taken, before drawing.
    fn sync(&mut self, _view: &DashboardView) {}

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, view: &DashboardView);
}
