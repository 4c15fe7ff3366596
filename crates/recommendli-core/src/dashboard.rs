//! Dashboard composition: which resource is fetched when.
//!
//! ```text
//!  startup ──► whoami (once)
//!  visible && user ──► poll current-track (2s) + poll index-summary (20s)
//!  user present ──► fetch preferences (once)
//!  playing && track id changed ──► check track in library (one-shot)
//!  GenerateDiscovery ──► generate (one-shot) ──ok──► invalidate + refetch index
//! ```
//!
//! The loop owns both polling controllers and re-evaluates every rule after
//! each visibility change, resource change or command.

use std::sync::Arc;
use std::time::Duration;

use recommendli_proto::api::{
    CurrentTrack, IndexSummary, Playlist, RecommendliApi, SimplePlaylist, Track, TrackInLibrary,
    User, UserPreferences,
};
use recommendli_proto::config::PollingConfig;
use recommendli_proto::error::ApiError;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::auth::AuthGate;
use crate::executor::{Executor, RunOutcome};
use crate::notify::Notifications;
use crate::polling::PollingController;
use crate::resource::{Resource, ResourceRecord};
use crate::visibility::VisibilityTracker;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub current_track_interval: Duration,
    pub index_summary_interval: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

impl From<&PollingConfig> for DashboardSettings {
    fn from(config: &PollingConfig) -> Self {
        Self {
            current_track_interval: config.current_track_interval(),
            index_summary_interval: config.index_summary_interval(),
        }
    }
}

/// Library status of the track a check was issued for.  `track_id` is the
/// id that was playing when the check started, which can differ from the
/// track currently playing.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStatus {
    pub track_id: String,
    pub in_library: bool,
    pub track: Option<Track>,
    pub playlists: Vec<SimplePlaylist>,
}

impl TrackStatus {
    fn new(track_id: String, answer: TrackInLibrary) -> Self {
        Self {
            track_id,
            in_library: answer.in_library,
            track: answer.track,
            playlists: answer.playlists,
        }
    }
}

pub struct Stores {
    pub user: Resource<User>,
    pub current_track: Resource<CurrentTrack>,
    pub track_status: Resource<TrackStatus>,
    pub index_summary: Resource<IndexSummary>,
    pub discovery: Resource<Playlist>,
    pub preferences: Resource<UserPreferences>,
}

impl Stores {
    fn new() -> Self {
        Self {
            user: Resource::new("user"),
            current_track: Resource::new("current-track"),
            track_status: Resource::new("track-status"),
            index_summary: Resource::new("index-summary"),
            discovery: Resource::new("discovery-playlist"),
            preferences: Resource::new("user-preferences"),
        }
    }

    pub fn view(&self, visible: bool) -> DashboardView {
        DashboardView {
            visible,
            user: self.user.snapshot(),
            current_track: self.current_track.snapshot(),
            track_status: self.track_status.snapshot(),
            index_summary: self.index_summary.snapshot(),
            discovery: self.discovery.snapshot(),
            preferences: self.preferences.snapshot(),
        }
    }
}

/// Point-in-time copy of every resource, for rendering.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub visible: bool,
    pub user: ResourceRecord<User>,
    pub current_track: ResourceRecord<CurrentTrack>,
    pub track_status: ResourceRecord<TrackStatus>,
    pub index_summary: ResourceRecord<IndexSummary>,
    pub discovery: ResourceRecord<Playlist>,
    pub preferences: ResourceRecord<UserPreferences>,
}

impl DashboardView {
    /// Nothing worth drawing yet: user or player state has never come back.
    pub fn is_loading(&self) -> bool {
        !self.user.is_ready() || !self.current_track.is_ready()
    }

    pub fn is_playing(&self) -> bool {
        self.current_track
            .value
            .as_ref()
            .map(|c| c.is_playing)
            .unwrap_or(false)
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.current_track.value.as_ref().and_then(|c| c.track.as_ref())
    }

    /// Library status, only if it belongs to the track playing right now.
    pub fn current_status(&self) -> Option<&TrackStatus> {
        let playing = self.now_playing()?;
        self.track_status
            .value
            .as_ref()
            .filter(|s| s.track_id == playing.id)
    }
}

#[derive(Debug, Clone)]
pub enum DashboardCommand {
    GenerateDiscovery { dry_run: bool },
    /// Mark the index summary stale and refetch it if polling is running.
    RefreshIndex,
    SavePreferences(UserPreferences),
    /// Fetch the user again and restart polling, e.g. after logging in.
    Reload,
    Shutdown,
}

/// Cheap, cloneable front-end side of a running [`Dashboard`].
#[derive(Clone)]
pub struct DashboardHandle {
    tx: mpsc::Sender<DashboardCommand>,
    stores: Arc<Stores>,
    visibility: VisibilityTracker,
}

impl DashboardHandle {
    pub async fn send(&self, command: DashboardCommand) -> anyhow::Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| anyhow::anyhow!("dashboard loop has stopped"))
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn view(&self) -> DashboardView {
        self.stores.view(self.visibility.is_visible())
    }
}

/// What one-shot tasks need after they leave the loop.
struct Shared {
    api: Arc<dyn RecommendliApi>,
    stores: Arc<Stores>,
    executor: Executor,
    notifications: Arc<Notifications>,
}

pub struct Dashboard {
    shared: Arc<Shared>,
    auth: Arc<AuthGate>,
    visibility: VisibilityTracker,
    commands: mpsc::Receiver<DashboardCommand>,
    /// Weak so that dropping every handle still ends the loop.
    loopback: mpsc::WeakSender<DashboardCommand>,
    current_track_poller: PollingController,
    index_poller: PollingController,
    status_checked_for: Option<String>,
    preferences_requested: bool,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn RecommendliApi>,
        visibility: VisibilityTracker,
        auth: Arc<AuthGate>,
        notifications: Arc<Notifications>,
        settings: DashboardSettings,
    ) -> (Self, DashboardHandle) {
        let stores = Arc::new(Stores::new());
        let shared = Arc::new(Shared {
            api,
            stores: Arc::clone(&stores),
            executor: Executor::new(Arc::clone(&auth)),
            notifications,
        });

        let current_track_poller = PollingController::new(
            "current-track",
            settings.current_track_interval,
            {
                let shared = Arc::clone(&shared);
                move || {
                    let shared = Arc::clone(&shared);
                    async move {
                        shared
                            .executor
                            .run(&shared.stores.current_track, shared.api.current_track())
                            .await;
                    }
                }
            },
        );

        let index_poller = PollingController::new(
            "index-summary",
            settings.index_summary_interval,
            {
                let shared = Arc::clone(&shared);
                move || {
                    let shared = Arc::clone(&shared);
                    async move {
                        shared
                            .executor
                            .run(&shared.stores.index_summary, shared.api.index_summary())
                            .await;
                    }
                }
            },
        );

        let (tx, commands) = mpsc::channel(64);
        let handle = DashboardHandle {
            tx: tx.clone(),
            stores,
            visibility: visibility.clone(),
        };

        let dashboard = Self {
            shared,
            auth,
            visibility,
            commands,
            loopback: tx.downgrade(),
            current_track_poller,
            index_poller,
            status_checked_for: None,
            preferences_requested: false,
        };
        (dashboard, handle)
    }

    /// Run until `Shutdown` arrives or every handle is dropped.
    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("dashboard: starting");
        let mut visible_rx = self.visibility.subscribe();
        let mut user_rx = self.shared.stores.user.subscribe();
        let mut track_rx = self.shared.stores.current_track.subscribe();

        if !self.shared.stores.user.is_ready() {
            self.fetch_user();
        }
        self.reconcile();

        loop {
            tokio::select! {
                Ok(()) = visible_rx.changed() => {}
                Ok(()) = user_rx.changed() => {}
                Ok(()) = track_rx.changed() => {}
                command = self.commands.recv() => match command {
                    None | Some(DashboardCommand::Shutdown) => break,
                    Some(command) => self.handle(command),
                },
            }
            self.reconcile();
        }

        self.current_track_poller.shutdown().await;
        self.index_poller.shutdown().await;
        info!("dashboard: stopped");
        Ok(())
    }

    fn reconcile(&mut self) {
        let user_present = self.shared.stores.user.has_value();
        let active = self.visibility.is_visible() && user_present;
        self.current_track_poller.set_active(active);
        self.index_poller.set_active(active);

        if user_present && !self.preferences_requested {
            self.preferences_requested = true;
            self.fetch_preferences();
        }

        // A failed check is retried on the next current-track tick.
        if self.shared.stores.track_status.fetch_state().is_failed() {
            self.status_checked_for = None;
        }

        if let Some(current) = self.shared.stores.current_track.value() {
            if let (true, Some(id)) = (current.is_playing, current.track_id()) {
                if self.status_checked_for.as_deref() != Some(id) {
                    let id = id.to_string();
                    self.status_checked_for = Some(id.clone());
                    self.check_track_status(id);
                }
            }
        }
    }

    fn handle(&mut self, command: DashboardCommand) {
        debug!("dashboard command: {:?}", command);
        match command {
            DashboardCommand::GenerateDiscovery { dry_run } => self.generate_discovery(dry_run),
            DashboardCommand::RefreshIndex => {
                self.shared.stores.index_summary.invalidate();
                self.index_poller.refresh();
            }
            DashboardCommand::SavePreferences(prefs) => self.save_preferences(prefs),
            DashboardCommand::Reload => {
                // A reload is a fresh login attempt, so a 401 redirects again.
                self.auth.rearm();
                self.fetch_user();
                self.current_track_poller.refresh();
                self.index_poller.refresh();
            }
            DashboardCommand::Shutdown => {}
        }
    }

    fn fetch_user(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared
                .executor
                .run(&shared.stores.user, shared.api.whoami())
                .await;
        });
    }

    fn fetch_preferences(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared
                .executor
                .run(&shared.stores.preferences, shared.api.user_preferences())
                .await;
        });
    }

    fn check_track_status(&self, track_id: String) {
        debug!("checking library status of {}", track_id);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let check = async {
                let answer = shared.api.check_current_track_in_library().await?;
                Ok::<_, ApiError>(TrackStatus::new(track_id, answer))
            };
            shared.executor.run(&shared.stores.track_status, check).await;
        });
    }

    fn generate_discovery(&self, dry_run: bool) {
        if self.shared.stores.discovery.is_loading() {
            self.shared
                .notifications
                .info("Discovery playlist is already being generated");
            return;
        }
        // Loading from here on, so a second command is refused even before
        // the task below gets to run.
        let ticket = self.shared.stores.discovery.begin();
        let shared = Arc::clone(&self.shared);
        let loopback = self.loopback.clone();
        tokio::spawn(async move {
            let outcome = shared
                .executor
                .settle(
                    &shared.stores.discovery,
                    ticket,
                    shared.api.generate_discovery_playlist(dry_run),
                )
                .await;
            match outcome {
                RunOutcome::Succeeded => {
                    let count = shared
                        .stores
                        .discovery
                        .value()
                        .map(|p| p.tracks.len())
                        .unwrap_or(0);
                    shared.notifications.success(format!(
                        "Discovery playlist {} ({} tracks)",
                        if dry_run { "previewed" } else { "generated" },
                        count
                    ));
                    // Generation changes the library the index reflects.
                    if let Some(tx) = loopback.upgrade() {
                        let _ = tx.send(DashboardCommand::RefreshIndex).await;
                    }
                }
                RunOutcome::Failed => report_failure(&shared, &shared.stores.discovery, "Generation"),
                RunOutcome::Superseded => {}
            }
        });
    }

    fn save_preferences(&self, prefs: UserPreferences) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = shared
                .executor
                .run(
                    &shared.stores.preferences,
                    shared.api.set_user_preferences(&prefs),
                )
                .await;
            match outcome {
                RunOutcome::Succeeded => shared.notifications.success("Preferences saved"),
                RunOutcome::Failed => {
                    report_failure(&shared, &shared.stores.preferences, "Saving preferences")
                }
                RunOutcome::Superseded => {}
            }
        });
    }
}

/// Toast for a failed one-shot.  Auth failures are left to the redirect.
fn report_failure<T: Clone>(shared: &Shared, resource: &Resource<T>, what: &str) {
    if let Some(error) = resource.fetch_state().last_error {
        if !error.is_auth() {
            shared.notifications.error(format!("{} failed: {}", what, error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch_state::FetchState;
    use chrono::Utc;

    fn record<T>(value: Option<T>) -> ResourceRecord<T>
    where
        T: Clone,
    {
        let resource = Resource::new("t");
        if let Some(v) = value {
            let ticket = resource.begin();
            resource.complete(ticket, Ok(v), Utc::now());
        }
        resource.snapshot()
    }

    fn track(id: &str) -> Track {
        Track {
            id: id.into(),
            name: id.into(),
            ..Default::default()
        }
    }

    fn view(current: Option<CurrentTrack>, status: Option<TrackStatus>) -> DashboardView {
        DashboardView {
            visible: true,
            user: record(Some(User::default())),
            current_track: record(current),
            track_status: record(status),
            index_summary: record(None),
            discovery: record(None),
            preferences: record(None),
        }
    }

    #[test]
    fn loading_until_track_is_ready() {
        let v = view(None, None);
        assert_eq!(v.current_track.fetch_state, FetchState::initial());
        assert!(v.is_loading());

        let v = view(Some(CurrentTrack::default()), None);
        assert!(!v.is_loading());
        assert!(!v.is_playing());
    }

    #[test]
    fn status_only_shown_for_playing_track() {
        let current = CurrentTrack {
            track: Some(track("b")),
            is_playing: true,
        };
        let old_status = TrackStatus {
            track_id: "a".into(),
            in_library: true,
            track: None,
            playlists: vec![],
        };
        let v = view(Some(current.clone()), Some(old_status.clone()));
        assert!(v.current_status().is_none());

        let fresh = TrackStatus {
            track_id: "b".into(),
            ..old_status
        };
        let v = view(Some(current), Some(fresh));
        assert!(v.current_status().unwrap().in_library);
    }
}
