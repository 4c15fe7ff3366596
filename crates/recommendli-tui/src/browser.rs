//! Handing URLs to the system browser, including the login redirect.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use recommendli_core::auth::AuthRedirect;
use recommendli_core::notify::Notifications;

pub fn open_url(url: &str) -> anyhow::Result<()> {
    open::that_detached(url).with_context(|| format!("failed to open {}", url))
}

/// Where a rejected session sends the user: the login page in a browser, or
/// a toast asking them to go there themselves.
pub struct BrowserRedirect {
    open_browser: bool,
    notifications: Arc<Notifications>,
}

impl BrowserRedirect {
    pub fn new(open_browser: bool, notifications: Arc<Notifications>) -> Self {
        Self {
            open_browser,
            notifications,
        }
    }
}

impl AuthRedirect for BrowserRedirect {
    fn redirect(&self, url: &str) {
        if !self.open_browser {
            self.notifications
                .warning("Not logged in: press L to log in, then r to reload");
            return;
        }
        match open_url(url) {
            Ok(()) => {
                info!("opened login page {}", url);
                self.notifications
                    .info("Opened the login page in your browser, press r when done");
            }
            Err(e) => {
                warn!("{:#}", e);
                self.notifications
                    .warning("Could not open a browser: press L to retry");
            }
        }
    }
}
