//! Runs one fetch against a [`Resource`] and turns its outcome into state.
//!
//! Errors never escape: callers get a [`RunOutcome`] and the resource gets
//! the error.  Auth failures are additionally handed to the [`AuthGate`].

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use recommendli_proto::error::ApiError;
use tracing::{debug, warn};

use crate::auth::AuthGate;
use crate::resource::{Resource, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed,
    /// A newer attempt started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Clone)]
pub struct Executor {
    auth: Arc<AuthGate>,
}

impl Executor {
    pub fn new(auth: Arc<AuthGate>) -> Self {
        Self { auth }
    }

    /// `operation` is not polled until the resource has moved to `Loading`.
    pub async fn run<T, Fut>(&self, resource: &Resource<T>, operation: Fut) -> RunOutcome
    where
        T: Clone,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let ticket = resource.begin();
        self.settle(resource, ticket, operation).await
    }

    /// Second half of [`Executor::run`], for callers that must see the
    /// resource as loading before the operation is handed off to a task.
    pub(crate) async fn settle<T, Fut>(
        &self,
        resource: &Resource<T>,
        ticket: Ticket,
        operation: Fut,
    ) -> RunOutcome
    where
        T: Clone,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        debug!(resource = resource.name(), "fetch state -> loading");

        let result = operation.await;
        let succeeded = result.is_ok();
        match &result {
            Ok(_) => self.auth.on_success(),
            Err(e) => {
                warn!(resource = resource.name(), "fetch failed: {}", e);
                self.auth.on_error(e);
            }
        }

        if !resource.complete(ticket, result, Utc::now()) {
            debug!(resource = resource.name(), "dropping superseded result");
            return RunOutcome::Superseded;
        }

        if succeeded {
            debug!(resource = resource.name(), "fetch state -> idle");
            RunOutcome::Succeeded
        } else {
            debug!(resource = resource.name(), "fetch state -> error");
            RunOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthRedirect;
    use crate::fetch_state::Phase;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingRedirect(AtomicUsize);

    impl AuthRedirect for CountingRedirect {
        fn redirect(&self, _url: &str) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn executor() -> (Executor, Arc<CountingRedirect>) {
        let redirects = Arc::new(CountingRedirect::default());
        let gate = AuthGate::new("http://h/login", Box::new(redirects.clone()));
        (Executor::new(Arc::new(gate)), redirects)
    }

    #[tokio::test]
    async fn success_stores_value() {
        let (exec, _) = executor();
        let resource = Resource::new("n");
        let outcome = exec.run(&resource, async { Ok::<_, ApiError>(5u8) }).await;
        assert_eq!(outcome, RunOutcome::Succeeded);
        assert_eq!(resource.value(), Some(5));
        assert_eq!(resource.fetch_state().phase, Phase::Idle);
        assert!(resource.fetch_state().last_completed_at.is_some());
    }

    #[tokio::test]
    async fn failure_becomes_state_not_panic() {
        let (exec, redirects) = executor();
        let resource = Resource::new("n");
        exec.run(&resource, async { Ok::<_, ApiError>(5u8) }).await;

        let outcome = exec
            .run(&resource, async { Err::<u8, _>(ApiError::Transport("reset".into())) })
            .await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert_eq!(resource.value(), Some(5));
        assert_eq!(
            resource.fetch_state().last_error,
            Some(ApiError::Transport("reset".into()))
        );
        assert_eq!(redirects.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn loading_is_visible_while_operation_runs() {
        let (exec, _) = executor();
        let resource = Resource::new("n");
        let mut rx = resource.subscribe();
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        let run = exec.run(&resource, async {
            let _ = wait.await;
            Ok::<_, ApiError>(1u8)
        });
        let observe = async {
            rx.changed().await.unwrap();
            assert!(rx.borrow_and_update().is_loading());
            let _ = release.send(());
        };
        let (outcome, ()) = tokio::join!(run, observe);
        assert_eq!(outcome, RunOutcome::Succeeded);
    }

    #[tokio::test]
    async fn auth_failure_reaches_gate_and_state() {
        let (exec, redirects) = executor();
        let resource: Resource<u8> = Resource::new("user");
        let outcome = exec
            .run(&resource, async { Err(ApiError::Unauthorized { status: 401 }) })
            .await;
        assert_eq!(outcome, RunOutcome::Failed);
        assert!(resource.is_ready());
        assert_eq!(redirects.0.load(Ordering::SeqCst), 1);
    }
}
