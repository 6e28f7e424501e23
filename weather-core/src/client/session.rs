use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    client::{
        backend::{HttpBackend, WeatherBackend},
        resolver::ConnectivityResolver,
        suggest::{SuggestionFetcher, SuggestionState},
    },
    config::ClientConfig,
    error::ClientError,
    model::{CitySuggestion, WeatherQuery, WeatherResult},
};

/// Error text shown in place of weather data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorNotice {
    /// No backend address answered; shown as an alert.
    Connectivity(String),
    /// The backend answered but the data request failed.
    Fetch(String),
}

impl ErrorNotice {
    pub fn message(&self) -> &str {
        match self {
            ErrorNotice::Connectivity(msg) | ErrorNotice::Fetch(msg) => msg,
        }
    }
}

/// Everything a front end needs to render the search screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub input: String,
    pub loading: bool,
    pub weather: Option<WeatherResult>,
    pub error: Option<ErrorNotice>,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Input was blank; nothing happened.
    Skipped,
    Completed(WeatherResult),
    Failed(ClientError),
    /// A newer submit started before this one finished; its result was dropped.
    Superseded,
    /// The session was shut down while the request was in flight.
    Cancelled,
}

/// Owns the search screen's state: input text, suggestions, the loading flag,
/// the displayed weather and the error line.
#[derive(Debug)]
pub struct WeatherSession {
    backend: Arc<dyn WeatherBackend>,
    resolver: Arc<ConnectivityResolver>,
    suggestions: SuggestionFetcher,
    view: watch::Sender<ViewState>,
    in_flight: AtomicUsize,
    latest_submit: AtomicU64,
    cancel: CancellationToken,
}

/// Holds the loading flag up for as long as it lives.
struct LoadingGuard<'a> {
    session: &'a WeatherSession,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(session: &'a WeatherSession) -> Self {
        session.in_flight.fetch_add(1, Ordering::AcqRel);
        session.view.send_modify(|v| v.loading = true);
        Self { session }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.session.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.session.view.send_modify(|v| v.loading = false);
        }
    }
}

impl WeatherSession {
    pub fn new(
        backend: Arc<dyn WeatherBackend>,
        resolver: Arc<ConnectivityResolver>,
        debounce: Duration,
    ) -> Self {
        let suggestions = SuggestionFetcher::new(backend.clone(), resolver.clone(), debounce);
        let (view, _) = watch::channel(ViewState::default());
        Self {
            backend,
            resolver,
            suggestions,
            view,
            in_flight: AtomicUsize::new(0),
            latest_submit: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    /// Wire an HTTP-backed session from the on-disk client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let backend: Arc<dyn WeatherBackend> = Arc::new(HttpBackend::new(config.request_timeout())?);
        let resolver = Arc::new(
            ConnectivityResolver::new(
                backend.clone(),
                config.effective_candidates(),
                config.effective_default_base_url(),
            )
            .with_probe_timeout(config.probe_timeout()),
        );
        Ok(Self::new(backend, resolver, config.debounce()))
    }

    pub fn resolver(&self) -> &Arc<ConnectivityResolver> {
        &self.resolver
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<SuggestionState> {
        self.suggestions.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.view.borrow().clone()
    }

    pub fn suggestions(&self) -> SuggestionState {
        self.suggestions.current()
    }

    /// Record a keystroke and reschedule the suggestion lookup.
    pub fn set_text(&self, text: &str) {
        self.view.send_modify(|v| v.input = text.to_string());
        self.suggestions.on_text_changed(text);
    }

    /// Replace the input with the suggestion's label and fetch its weather.
    pub async fn select_suggestion(&self, suggestion: &CitySuggestion) -> SubmitOutcome {
        let label = suggestion.label();
        self.view.send_modify(|v| v.input = label);
        self.suggestions.clear();
        self.submit().await
    }

    /// Fetch weather for the current input text.
    pub async fn submit(&self) -> SubmitOutcome {
        let input = self.view.borrow().input.clone();
        let query = match WeatherQuery::new(&input) {
            Ok(query) => query,
            Err(_) => return SubmitOutcome::Skipped,
        };
        if self.cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let ticket = self.latest_submit.fetch_add(1, Ordering::AcqRel) + 1;
        let _loading = LoadingGuard::acquire(self);
        self.view.send_modify(|v| v.error = None);

        let result = tokio::select! {
            _ = self.cancel.cancelled() => return SubmitOutcome::Cancelled,
            result = self.fetch(&query) => result,
        };

        if self.latest_submit.load(Ordering::Acquire) != ticket {
            info!(city = query.city(), "discarding superseded weather response");
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(weather) => {
                let shown = weather.clone();
                self.view.send_modify(|v| {
                    v.weather = Some(shown);
                    v.error = None;
                });
                SubmitOutcome::Completed(weather)
            }
            Err(err) => {
                warn!(city = query.city(), error = %err, "weather fetch failed");
                let notice = match err {
                    ClientError::Connectivity => {
                        ErrorNotice::Connectivity(err.user_message().to_string())
                    }
                    _ => ErrorNotice::Fetch(err.user_message().to_string()),
                };
                self.view.send_modify(|v| {
                    v.weather = None;
                    v.error = Some(notice);
                });
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherResult, ClientError> {
        let base_url = self.resolver.ensure_connected().await?;

        match self.backend.weather(&base_url, query).await {
            Ok(weather) => Ok(weather),
            Err(err) => {
                if err.is_connectivity() {
                    self.resolver.mark_stale();
                }
                Err(err)
            }
        }
    }

    /// Stop applying responses. In-flight submits resolve as `Cancelled`.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.suggestions.clear();
    }
}
