mod action;
mod app;
mod browser;
mod component;
mod components;
mod theme;
mod widgets;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use recommendli_core::auth::AuthGate;
use recommendli_core::dashboard::{Dashboard, DashboardSettings};
use recommendli_core::notify::Notifications;
use recommendli_core::visibility::visibility;
use recommendli_proto::client::{auth_redirect_url, RecommendliClient};
use recommendli_proto::config::Config;
use recommendli_proto::platform;

use crate::browser::BrowserRedirect;

#[derive(Parser, Debug)]
#[command(name = "recommendli", version, about = "Terminal dashboard for recommendli")]
struct Args {
    /// Server origin, overrides `[api] server_url` from the config file
    #[arg(long)]
    server: Option<String>,

    /// Config file to use instead of ~/.config/recommendli/config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("recommendli log: {}", log_path.display());

    info!("recommendli starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config_path = args.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path).unwrap_or_else(|e| {
        warn!("config {}: {:#}; using defaults", config_path.display(), e);
        Config::default()
    });
    if let Some(server) = args.server {
        config.api.server_url = server;
    }
    info!("server: {}", config.api.server_url);

    // ── Dashboard ────────────────────────────────────────────────────────────
    let notifications = Arc::new(Notifications::new());
    let login_url = auth_redirect_url(&config.api.server_url, &config.api.return_url())?;
    let auth = Arc::new(AuthGate::new(
        login_url.to_string(),
        Box::new(BrowserRedirect::new(
            config.ui.open_browser_on_auth,
            notifications.clone(),
        )),
    ));
    let client = RecommendliClient::new(&config.api.server_url, config.api.request_timeout())?;

    // Terminals that never report focus just stay visible.
    let (visibility_writer, visibility_tracker) = visibility(true);

    let (dashboard, handle) = Dashboard::new(
        Arc::new(client),
        visibility_tracker,
        auth,
        notifications.clone(),
        DashboardSettings::from(&config.polling),
    );

    let dashboard_notifications = notifications.clone();
    tokio::spawn(async move {
        if let Err(e) = dashboard.run().await {
            error!("dashboard exited with error: {:#}", e);
            dashboard_notifications.error(format!("Dashboard stopped: {:#}", e));
        }
    });

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(
        handle,
        visibility_writer,
        notifications,
        login_url.to_string(),
    );
    if let Err(e) = app.run().await {
        error!("tui exited with error: {:#}", e);
        return Err(e);
    }

    info!("recommendli stopped");
    Ok(())
}
