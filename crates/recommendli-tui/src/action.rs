//! Action enum — all user-initiated intents and internal events.

use recommendli_proto::api::UserPreferences;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    NowPlaying,
    Discovery,
    Library,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Dashboard ────────────────────────────────────────────────────────────
    GenerateDiscovery { dry_run: bool },
    RefreshIndex,
    SavePreferences(UserPreferences),
    Reload,
    Login,

    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),
    SelectUp(usize),
    SelectDown(usize),
    SelectFirst,
    SelectLast,

    // ── UI ───────────────────────────────────────────────────────────────────
    OpenUrl(String),
    ToggleHelp,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
