//! Payloads served by the recommendations API and the trait the dashboard
//! talks to.  Field names follow the wire format.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Path prefix shared by every endpoint.
pub const API_PREFIX: &str = "/recommendations/v1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Track {
    /// "Artist A, Artist B – Title"
    pub fn display(&self) -> String {
        if self.artists.is_empty() {
            return self.name.clone();
        }
        let artists = self
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} – {}", artists, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub display_name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimplePlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// A generated playlist.  `tracks` is always flat once decoded, whether the
/// server sent a paged `{items: [{track}]}` object or a plain array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub snapshot_id: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default, deserialize_with = "deserialize_tracks")]
    pub tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct PlaylistItem {
    #[serde(default)]
    track: Option<Track>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TracksField {
    Paged { items: Vec<PlaylistItem> },
    Flat(Vec<Track>),
}

fn deserialize_tracks<'de, D>(deserializer: D) -> Result<Vec<Track>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = Option::<TracksField>::deserialize(deserializer)?;
    Ok(match field {
        Some(TracksField::Paged { items }) => items.into_iter().filter_map(|i| i.track).collect(),
        Some(TracksField::Flat(tracks)) => tracks,
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub playlist_count: u64,
    pub unique_track_count: u64,
    #[serde(default)]
    pub playlists: Vec<SimplePlaylist>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentTrack {
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default)]
    pub is_playing: bool,
}

impl CurrentTrack {
    pub fn track_id(&self) -> Option<&str> {
        self.track.as_ref().map(|t| t.id.as_str())
    }
}

/// Answer of `/check-current-track-in-library`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackInLibrary {
    pub in_library: bool,
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub playlists: Vec<SimplePlaylist>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub library_pattern: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub discovery_playlist_names: Vec<String>,
    #[serde(default)]
    pub weighted_words: BTreeMap<String, i64>,
    #[serde(default)]
    pub minimum_album_size: u32,
}

/// Every call the dashboard makes against the recommendations service.
#[async_trait]
pub trait RecommendliApi: Send + Sync {
    async fn whoami(&self) -> Result<User, ApiError>;

    async fn current_track(&self) -> Result<CurrentTrack, ApiError>;

    async fn check_current_track_in_library(&self) -> Result<TrackInLibrary, ApiError>;

    async fn generate_discovery_playlist(&self, dry_run: bool) -> Result<Playlist, ApiError>;

    async fn index_summary(&self) -> Result<IndexSummary, ApiError>;

    async fn user_preferences(&self) -> Result<UserPreferences, ApiError>;

    async fn set_user_preferences(&self, prefs: &UserPreferences)
        -> Result<UserPreferences, ApiError>;
}
