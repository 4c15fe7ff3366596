//! Process-wide escape hatch for expired sessions.
//!
//! Auth failures are still recorded on the resource that saw them, but they
//! also reach the [`AuthGate`], which sends the user through the login flow.
//! The gate fires once and stays latched until a request succeeds again or
//! the dashboard is reloaded, so a burst of 401s from several pollers
//! produces a single redirect.

use std::sync::atomic::{AtomicBool, Ordering};

use recommendli_proto::error::ApiError;
use tracing::warn;

/// Whatever "navigate to the login page" means for the front-end.
pub trait AuthRedirect: Send + Sync {
    fn redirect(&self, url: &str);
}

pub struct AuthGate {
    redirect_url: String,
    target: Box<dyn AuthRedirect>,
    latched: AtomicBool,
}

impl AuthGate {
    pub fn new(redirect_url: impl Into<String>, target: Box<dyn AuthRedirect>) -> Self {
        Self {
            redirect_url: redirect_url.into(),
            target,
            latched: AtomicBool::new(false),
        }
    }

    /// Returns `true` when this call performed the redirect.
    pub fn on_error(&self, error: &ApiError) -> bool {
        if !error.is_auth() {
            return false;
        }
        if self.latched.swap(true, Ordering::SeqCst) {
            return false;
        }
        warn!("session rejected ({}), redirecting to {}", error, self.redirect_url);
        self.target.redirect(&self.redirect_url);
        true
    }

    /// A request got through, so the next auth failure is a new one.
    pub fn on_success(&self) {
        self.latched.store(false, Ordering::SeqCst);
    }

    /// Forget the previous redirect without waiting for a success.
    pub fn rearm(&self) {
        self.latched.store(false, Ordering::SeqCst);
    }

    pub fn has_redirected(&self) -> bool {
        self.latched.load(Ordering::SeqCst)
    }
}

impl<R: AuthRedirect + ?Sized> AuthRedirect for std::sync::Arc<R> {
    fn redirect(&self, url: &str) {
        (**self).redirect(url)
    }
}
