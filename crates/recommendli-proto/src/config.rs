use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin serving `/recommendations/v1`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Where the login flow sends the user back to.  Empty means the server root.
    #[serde(default)]
    pub return_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_current_track_interval_ms")]
    pub current_track_interval_ms: u64,
    #[serde(default = "default_index_summary_interval_ms")]
    pub index_summary_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_open_browser_on_auth")]
    pub open_browser_on_auth: bool,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn return_url(&self) -> String {
        if self.return_url.is_empty() {
            format!("{}/", self.server_url.trim_end_matches('/'))
        } else {
            self.return_url.clone()
        }
    }
}

impl PollingConfig {
    pub fn current_track_interval(&self) -> Duration {
        Duration::from_millis(self.current_track_interval_ms)
    }

    pub fn index_summary_interval(&self) -> Duration {
        Duration::from_millis(self.index_summary_interval_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            return_url: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            current_track_interval_ms: default_current_track_interval_ms(),
            index_summary_interval_ms: default_index_summary_interval_ms(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            open_browser_on_auth: default_open_browser_on_auth(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_current_track_interval_ms() -> u64 {
    2_000
}

fn default_index_summary_interval_ms() -> u64 {
    20_000
}

fn default_open_browser_on_auth() -> bool {
    true
}

impl Config {
    /// Writes the defaults on first run.
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            polling: PollingConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.polling.current_track_interval(), Duration::from_secs(2));
        assert_eq!(config.polling.index_summary_interval(), Duration::from_secs(20));
        assert_eq!(config.api.return_url(), "http://127.0.0.1:8080/");
        assert!(config.ui.open_browser_on_auth);
        assert!(Config::config_path().ends_with("recommendli/config.toml"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            server_url = "https://recommendli.example"
            return_url = "https://recommendli.example/dashboard"

            [polling]
            current_track_interval_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.api.return_url(), "https://recommendli.example/dashboard");
        assert_eq!(config.polling.current_track_interval_ms, 5000);
        assert_eq!(config.polling.index_summary_interval_ms, 20_000);
    }
}
