//! reqwest-backed implementation of [`RecommendliApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{
    CurrentTrack, IndexSummary, Playlist, RecommendliApi, TrackInLibrary, User, UserPreferences,
    API_PREFIX,
};
use crate::error::ApiError;

pub struct RecommendliClient {
    http: reqwest::Client,
    base: String,
}

impl RecommendliClient {
    /// `server_url` is the origin serving the API, e.g. `http://127.0.0.1:8080`.
    pub fn new(server_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        // Redirects are never followed: a redirect from the API means the
        // session is gone and the login flow has to take over.
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .user_agent(concat!("recommendli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base = format!("{}{}", server_url.trim_end_matches('/'), API_PREFIX);
        Url::parse(&base)?;

        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        debug!("GET {}", url);
        let response = self.http.get(&url).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map non-success responses onto [`ApiError`].
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_redirection() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        warn!("API answered {} (redirect to {:?})", status, location);
        return Err(ApiError::Redirected { location });
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!("API answered {}", status);
        return Err(ApiError::Unauthorized {
            status: status.as_u16(),
        });
    }

    if status.is_client_error() || status.is_server_error() {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false);
        let body = if is_json {
            response.json::<serde_json::Value>().await.ok()
        } else {
            None
        };
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unexpected status").to_string(),
            body,
        });
    }

    Ok(response)
}

/// URL that starts the login flow and returns the user to `return_url`.
pub fn auth_redirect_url(server_url: &str, return_url: &str) -> anyhow::Result<Url> {
    let mut url = Url::parse(&format!(
        "{}{}/spotify/auth/ui-redirect",
        server_url.trim_end_matches('/'),
        API_PREFIX
    ))?;
    url.query_pairs_mut().append_pair("url", return_url);
    Ok(url)
}

#[async_trait]
impl RecommendliApi for RecommendliClient {
    async fn whoami(&self) -> Result<User, ApiError> {
        self.get("/whoami").await
    }

    async fn current_track(&self) -> Result<CurrentTrack, ApiError> {
        self.get("/current-track").await
    }

    async fn check_current_track_in_library(&self) -> Result<TrackInLibrary, ApiError> {
        self.get("/check-current-track-in-library").await
    }

    async fn generate_discovery_playlist(&self, dry_run: bool) -> Result<Playlist, ApiError> {
        self.get(&format!("/generate-discovery-playlist?dryrun={}", dry_run))
            .await
    }

    async fn index_summary(&self) -> Result<IndexSummary, ApiError> {
        self.get("/index/summary").await
    }

    async fn user_preferences(&self) -> Result<UserPreferences, ApiError> {
        self.get("/user-preferences").await
    }

    async fn set_user_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, ApiError> {
        let url = self.endpoint("/user-preferences");
        debug!("POST {}", url);
        let response = self.http.post(&url).json(prefs).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<UserPreferences>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(server: &str) -> RecommendliClient {
        RecommendliClient::new(server, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn whoami_decodes_user() {
        let app = Router::new().route(
            "/recommendations/v1/whoami",
            get(|| async {
                Json(serde_json::json!({
                    "display_name": "dj",
                    "external_urls": {"spotify": "https://open.spotify.com/user/dj"}
                }))
            }),
        );
        let server = serve(app).await;

        let user = client(&server).whoami().await.unwrap();
        assert_eq!(user.display_name, "dj");
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let app = Router::new().route(
            "/recommendations/v1/whoami",
            get(|| async { AxumStatus::UNAUTHORIZED }),
        );
        let server = serve(app).await;

        let err = client(&server).whoami().await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized { status: 401 });
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn redirect_is_not_followed() {
        let app = Router::new().route(
            "/recommendations/v1/current-track",
            get(|| async {
                (
                    AxumStatus::FOUND,
                    [(header::LOCATION, "https://accounts.spotify.com/authorize")],
                )
                    .into_response()
            }),
        );
        let server = serve(app).await;

        let err = client(&server).current_track().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Redirected {
                location: Some("https://accounts.spotify.com/authorize".into())
            }
        );
    }

    #[tokio::test]
    async fn server_error_keeps_json_body() {
        let app = Router::new().route(
            "/recommendations/v1/index/summary",
            get(|| async {
                (
                    AxumStatus::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({"error": "index locked"})),
                )
            }),
        );
        let server = serve(app).await;

        match client(&server).index_summary().await.unwrap_err() {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, Some(serde_json::json!({"error": "index locked"})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_passes_dryrun_and_unwraps_items() {
        let app = Router::new().route(
            "/recommendations/v1/generate-discovery-playlist",
            get(
                |axum::extract::RawQuery(query): axum::extract::RawQuery| async move {
                    assert_eq!(query.as_deref(), Some("dryrun=false"));
                    Json(serde_json::json!({
                        "id": "p1",
                        "name": "Discovery",
                        "tracks": {"items": [{"track": {"id": "t1", "name": "One"}}]}
                    }))
                },
            ),
        );
        let server = serve(app).await;

        let playlist = client(&server)
            .generate_discovery_playlist(false)
            .await
            .unwrap();
        assert_eq!(playlist.tracks.len(), 1);
        assert_eq!(playlist.tracks[0].id, "t1");
    }

    #[tokio::test]
    async fn preferences_are_posted_as_json() {
        let app = Router::new().route(
            "/recommendations/v1/user-preferences",
            axum::routing::post(|Json(prefs): Json<UserPreferences>| async move { Json(prefs) }),
        );
        let server = serve(app).await;

        let prefs = UserPreferences {
            library_pattern: "^Library".into(),
            minimum_album_size: 4,
            ..Default::default()
        };
        let echoed = client(&server).set_user_preferences(&prefs).await.unwrap();
        assert_eq!(echoed, prefs);
    }

    #[test]
    fn auth_redirect_url_encodes_return_url() {
        let url = auth_redirect_url("http://localhost:8080/", "http://localhost:8080/?tab=1").unwrap();
        assert_eq!(url.path(), "/recommendations/v1/spotify/auth/ui-redirect");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(value, "http://localhost:8080/?tab=1");
    }
}
