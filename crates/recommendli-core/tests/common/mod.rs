#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use recommendli_core::auth::{AuthGate, AuthRedirect};
use recommendli_core::dashboard::{Dashboard, DashboardHandle, DashboardSettings};
use recommendli_core::notify::Notifications;
use recommendli_core::visibility::{visibility, VisibilityWriter};
use recommendli_proto::api::{
    CurrentTrack, IndexSummary, Playlist, RecommendliApi, Track, TrackInLibrary, User,
    UserPreferences,
};
use recommendli_proto::error::ApiError;
use serde_json::json;
use tokio::task::JoinHandle;

pub const SERVER: &str = "http://localhost:8080";
pub const GENERATION_LATENCY: Duration = Duration::from_millis(500);

#[derive(Default)]
pub struct Calls {
    pub whoami: AtomicUsize,
    pub current_track: AtomicUsize,
    pub check_track: AtomicUsize,
    pub generate: AtomicUsize,
    pub index_summary: AtomicUsize,
    pub preferences: AtomicUsize,
    pub save_preferences: AtomicUsize,
}

/// In-memory API with call counters and a scriptable player.
pub struct FakeApi {
    pub calls: Calls,
    whoami: Mutex<Result<User, ApiError>>,
    current: Mutex<CurrentTrack>,
    fail_generation: AtomicBool,
    failing_checks: AtomicUsize,
    dry_runs: Mutex<Vec<bool>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Calls::default(),
            whoami: Mutex::new(Ok(User {
                display_name: "ada".into(),
                ..Default::default()
            })),
            current: Mutex::new(CurrentTrack::default()),
            fail_generation: AtomicBool::new(false),
            failing_checks: AtomicUsize::new(0),
            dry_runs: Mutex::new(Vec::new()),
        })
    }

    pub fn set_whoami(&self, result: Result<User, ApiError>) {
        *self.whoami.lock().unwrap() = result;
    }

    pub fn play(&self, id: &str) {
        *self.current.lock().unwrap() = CurrentTrack {
            track: Some(track(id)),
            is_playing: true,
        };
    }

    pub fn pause(&self) {
        self.current.lock().unwrap().is_playing = false;
    }

    pub fn fail_generation(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    /// The next `n` library checks answer 503.
    pub fn fail_next_checks(&self, n: usize) {
        self.failing_checks.store(n, Ordering::SeqCst);
    }

    pub fn dry_runs(&self) -> Vec<bool> {
        self.dry_runs.lock().unwrap().clone()
    }
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.into(),
        name: format!("Song {id}"),
        ..Default::default()
    }
}

#[async_trait]
impl RecommendliApi for FakeApi {
    async fn whoami(&self) -> Result<User, ApiError> {
        self.calls.whoami.fetch_add(1, Ordering::SeqCst);
        self.whoami.lock().unwrap().clone()
    }

    async fn current_track(&self) -> Result<CurrentTrack, ApiError> {
        self.calls.current_track.fetch_add(1, Ordering::SeqCst);
        Ok(self.current.lock().unwrap().clone())
    }

    async fn check_current_track_in_library(&self) -> Result<TrackInLibrary, ApiError> {
        self.calls.check_track.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing_checks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(ApiError::Status {
                status: 503,
                message: "library index busy".into(),
                body: None,
            });
        }
        let current = self.current.lock().unwrap().clone();
        Ok(TrackInLibrary {
            in_library: true,
            track: current.track,
            playlists: vec![],
        })
    }

    async fn generate_discovery_playlist(&self, dry_run: bool) -> Result<Playlist, ApiError> {
        self.calls.generate.fetch_add(1, Ordering::SeqCst);
        self.dry_runs.lock().unwrap().push(dry_run);
        tokio::time::sleep(GENERATION_LATENCY).await;
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "spotify is down".into(),
                body: None,
            });
        }
        // Paged shape, as the server sends it.
        let body = json!({
            "id": "pl1",
            "name": "Discovery",
            "tracks": { "items": [
                { "track": { "id": "t1", "name": "One" } },
                { "track": { "id": "t2", "name": "Two" } }
            ]}
        });
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn index_summary(&self) -> Result<IndexSummary, ApiError> {
        let n = self.calls.index_summary.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(IndexSummary {
            playlist_count: n as u64,
            unique_track_count: 10,
            playlists: vec![],
        })
    }

    async fn user_preferences(&self) -> Result<UserPreferences, ApiError> {
        self.calls.preferences.fetch_add(1, Ordering::SeqCst);
        Ok(UserPreferences {
            library_pattern: "^Library".into(),
            minimum_album_size: 4,
            ..Default::default()
        })
    }

    async fn set_user_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, ApiError> {
        self.calls.save_preferences.fetch_add(1, Ordering::SeqCst);
        Ok(prefs.clone())
    }
}

#[derive(Default)]
pub struct RecordingRedirect(Mutex<Vec<String>>);

impl RecordingRedirect {
    pub fn urls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl AuthRedirect for RecordingRedirect {
    fn redirect(&self, url: &str) {
        self.0.lock().unwrap().push(url.to_string());
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub handle: DashboardHandle,
    pub writer: VisibilityWriter,
    pub redirects: Arc<RecordingRedirect>,
    pub auth: Arc<AuthGate>,
    pub notifications: Arc<Notifications>,
    pub task: JoinHandle<anyhow::Result<()>>,
}

pub fn login_url() -> String {
    recommendli_proto::client::auth_redirect_url(SERVER, &format!("{SERVER}/"))
        .unwrap()
        .to_string()
}

pub fn start(api: Arc<FakeApi>, visible: bool) -> Harness {
    let (writer, tracker) = visibility(visible);
    let redirects = Arc::new(RecordingRedirect::default());
    let auth = Arc::new(AuthGate::new(login_url(), Box::new(redirects.clone())));
    let notifications = Arc::new(Notifications::new());
    let (dashboard, handle) = Dashboard::new(
        api.clone(),
        tracker,
        auth.clone(),
        notifications.clone(),
        DashboardSettings::default(),
    );
    let task = tokio::spawn(dashboard.run());
    Harness {
        api,
        handle,
        writer,
        redirects,
        auth,
        notifications,
        task,
    }
}

/// Let every ready task run without crossing any poll boundary.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
