//! Per-resource store: last good value plus its fetch state.
//!
//! Every mutation replaces the whole [`ResourceRecord`] inside a
//! `tokio::sync::watch` channel, so subscribers always see a consistent
//! snapshot and are woken as soon as the replacement is done.

use chrono::{DateTime, Utc};
use recommendli_proto::error::ApiError;
use tokio::sync::watch;

use crate::fetch_state::FetchState;

#[derive(Debug, Clone)]
pub struct ResourceRecord<T> {
    /// Last successfully fetched value.  Survives failed refreshes.
    pub value: Option<T>,
    pub fetch_state: FetchState,
    /// Marked for refetch; cleared by the next successful fetch.
    pub stale: bool,
    /// Tag of the most recently started attempt.
    attempt: u64,
}

impl<T> ResourceRecord<T> {
    fn new() -> Self {
        Self {
            value: None,
            fetch_state: FetchState::initial(),
            stale: false,
            attempt: 0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.fetch_state.is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_state.is_loading()
    }
}

/// Result tag handed out by [`Resource::begin`].  Only the attempt holding
/// the newest ticket may write its result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct Resource<T> {
    name: &'static str,
    tx: watch::Sender<ResourceRecord<T>>,
}

impl<T: Clone> Resource<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _rx) = watch::channel(ResourceRecord::new());
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> ResourceRecord<T> {
        self.tx.borrow().clone()
    }

    pub fn value(&self) -> Option<T> {
        self.tx.borrow().value.clone()
    }

    pub fn has_value(&self) -> bool {
        self.tx.borrow().value.is_some()
    }

    pub fn fetch_state(&self) -> FetchState {
        self.tx.borrow().fetch_state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_ready()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceRecord<T>> {
        self.tx.subscribe()
    }

    /// Mark the value as out of date.  The next successful fetch clears it.
    pub fn invalidate(&self) {
        self.tx.send_if_modified(|record| {
            let changed = !record.stale;
            record.stale = true;
            changed
        });
    }

    /// Start an attempt: phase goes to `Loading` while the value stays.
    /// Any attempt started earlier loses the right to write its result.
    pub(crate) fn begin(&self) -> Ticket {
        let mut ticket = Ticket(0);
        self.tx.send_modify(|record| {
            record.attempt += 1;
            record.fetch_state = record.fetch_state.loading();
            ticket = Ticket(record.attempt);
        });
        ticket
    }

    /// Write the outcome of the attempt tagged `ticket`.  Returns `false`
    /// (and leaves the record untouched) when a newer attempt has started.
    pub(crate) fn complete(
        &self,
        ticket: Ticket,
        result: Result<T, ApiError>,
        at: DateTime<Utc>,
    ) -> bool {
        self.tx.send_if_modified(|record| {
            if record.attempt != ticket.0 {
                return false;
            }
            match result {
                Ok(value) => {
                    record.value = Some(value);
                    record.fetch_state = record.fetch_state.succeeded(at);
                    record.stale = false;
                }
                Err(error) => {
                    record.fetch_state = record.fetch_state.failed(error, at);
                }
            }
            true
        })
    }
}
