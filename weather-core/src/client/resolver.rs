use arc_swap::ArcSwapOption;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tracing::{info, warn};

use crate::{client::backend::WeatherBackend, error::ClientError};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Works out which candidate base URL currently reaches the backend and
/// remembers the answer for later calls.
///
/// The active URL is a single atomically swapped value. Concurrent probes may
/// interleave; whichever succeeds last wins.
#[derive(Debug)]
pub struct ConnectivityResolver {
    backend: Arc<dyn WeatherBackend>,
    candidates: Vec<String>,
    default_base_url: String,
    probe_timeout: Duration,
    active: ArcSwapOption<String>,
    verified: AtomicBool,
}

impl ConnectivityResolver {
    pub fn new(
        backend: Arc<dyn WeatherBackend>,
        candidates: Vec<String>,
        default_base_url: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            candidates,
            default_base_url: default_base_url.into(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            active: ArcSwapOption::empty(),
            verified: AtomicBool::new(false),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Probe candidates in order and stop at the first one that answers.
    ///
    /// On total failure the previously active URL, if any, is kept.
    pub async fn probe(&self) -> Result<String, ClientError> {
        for candidate in &self.candidates {
            match self.backend.ping(candidate, self.probe_timeout).await {
                Ok(()) => {
                    info!(base_url = %candidate, "backend reachable");
                    self.active.store(Some(Arc::new(candidate.clone())));
                    self.verified.store(true, Ordering::Release);
                    return Ok(candidate.clone());
                }
                Err(err) => {
                    warn!(base_url = %candidate, error = %err, "backend candidate failed liveness probe");
                }
            }
        }

        warn!(candidates = self.candidates.len(), "no backend candidate reachable");
        Err(ClientError::Connectivity)
    }

    /// Last candidate that answered a probe, or the configured default.
    pub fn active_base_url(&self) -> String {
        match self.active.load_full() {
            Some(url) => url.as_ref().clone(),
            None => self.default_base_url.clone(),
        }
    }

    /// Whether a probe has succeeded since the last [`mark_stale`](Self::mark_stale).
    pub fn is_established(&self) -> bool {
        self.verified.load(Ordering::Acquire)
    }

    /// Force the next orchestrated call to re-probe. The last-known-good URL
    /// is still returned by [`active_base_url`](Self::active_base_url).
    pub fn mark_stale(&self) {
        self.verified.store(false, Ordering::Release);
    }

    /// Probe only if connectivity has not been established yet.
    pub async fn ensure_connected(&self) -> Result<String, ClientError> {
        if self.is_established() {
            return Ok(self.active_base_url());
        }
        self.probe().await
    }
}
