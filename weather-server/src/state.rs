use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use weather_core::WeatherProvider;

use crate::{config::ServerConfig, rate_limit::RateLimiter};

/// Shared by every handler. Only the rate limiter table and the request id
/// counter change after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub provider: Arc<dyn WeatherProvider>,
    pub limiter: Arc<RateLimiter>,
    request_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(config: ServerConfig, provider: Arc<dyn WeatherProvider>) -> Self {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit));
        Self {
            config: Arc::new(config),
            provider,
            limiter,
            request_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn next_request_id(&self) -> String {
        format!("req-{}", self.request_seq.fetch_add(1, Ordering::Relaxed))
    }
}
