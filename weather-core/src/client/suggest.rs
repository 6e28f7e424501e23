use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

use crate::{
    client::{backend::WeatherBackend, resolver::ConnectivityResolver},
    model::{CityQuery, CitySuggestion},
    provider::CITY_SUGGESTION_LIMIT,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of one geocoding lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    Matches(Vec<CitySuggestion>),
    /// The lookup failed; presentation shows nothing.
    Failed(String),
}

impl SuggestionOutcome {
    /// What a list view should show. Failures render as no suggestions.
    pub fn suggestions(&self) -> &[CitySuggestion] {
        match self {
            SuggestionOutcome::Matches(list) => list,
            SuggestionOutcome::Failed(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionState {
    #[default]
    Cleared,
    Ready { query: String, outcome: SuggestionOutcome },
}

impl SuggestionState {
    pub fn suggestions(&self) -> &[CitySuggestion] {
        match self {
            SuggestionState::Cleared => &[],
            SuggestionState::Ready { outcome, .. } => outcome.suggestions(),
        }
    }
}

/// Turns every keystroke into at most one geocoding request, issued once the
/// text has been quiet for the debounce period.
#[derive(Debug)]
pub struct SuggestionFetcher {
    backend: Arc<dyn WeatherBackend>,
    resolver: Arc<ConnectivityResolver>,
    quiet_period: Duration,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    state: Arc<watch::Sender<SuggestionState>>,
}

impl SuggestionFetcher {
    pub fn new(
        backend: Arc<dyn WeatherBackend>,
        resolver: Arc<ConnectivityResolver>,
        quiet_period: Duration,
    ) -> Self {
        let (state, _) = watch::channel(SuggestionState::Cleared);
        Self {
            backend,
            resolver,
            quiet_period,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> SuggestionState {
        self.state.borrow().clone()
    }

    /// Feed the latest input text. Must be called from within a Tokio runtime.
    pub fn on_text_changed(&self, text: &str) {
        let generation = self.supersede();

        let query = match CityQuery::for_suggestions(text) {
            Ok(query) => query,
            Err(_) => {
                self.state.send_replace(SuggestionState::Cleared);
                return;
            }
        };

        let backend = self.backend.clone();
        let resolver = self.resolver.clone();
        let current = self.generation.clone();
        let state = self.state.clone();
        let quiet_period = self.quiet_period;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if current.load(Ordering::Acquire) != generation {
                return;
            }

            let base_url = resolver.active_base_url();
            let outcome = match backend.cities(&base_url, &query).await {
                Ok(mut list) => {
                    list.truncate(CITY_SUGGESTION_LIMIT);
                    SuggestionOutcome::Matches(list)
                }
                Err(err) => {
                    debug!(query = query.query(), error = %err, "suggestion fetch failed");
                    SuggestionOutcome::Failed(err.to_string())
                }
            };

            // The text may have moved on while the request was in flight.
            let ready = SuggestionState::Ready { query: query.query().to_string(), outcome };
            publish_if_current(&state, &current, generation, ready);
        });

        *self.pending.lock() = Some(handle);
    }

    /// Drop any scheduled or in-flight fetch and hide suggestions.
    pub fn clear(&self) {
        self.supersede();
        self.state.send_replace(SuggestionState::Cleared);
    }

    fn supersede(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
        generation
    }
}

/// Publish `ready` only if `generation` is still the latest. The check runs
/// under the channel's write lock, so a concurrent `clear()` either lands
/// before it (and the list is dropped) or after it (and overwrites the list).
fn publish_if_current(
    state: &watch::Sender<SuggestionState>,
    current: &AtomicU64,
    generation: u64,
    ready: SuggestionState,
) -> bool {
    state.send_if_modified(|slot| {
        if current.load(Ordering::Acquire) != generation {
            return false;
        }
        *slot = ready;
        true
    })
}

impl Drop for SuggestionFetcher {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
