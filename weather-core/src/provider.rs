use crate::{
    error::ProviderError,
    model::{CitySuggestion, WeatherResult},
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Upper bound on suggestions returned for one geocoding lookup.
pub const CITY_SUGGESTION_LIMIT: usize = 5;

pub const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";

/// Upstream API the proxy forwards to.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for an already-sanitized city name, in metric units.
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, ProviderError>;

    /// Ranked localities matching `query`, at most `limit` of them.
    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, ProviderError>;
}

/// Connection settings for an upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub weather_base_url: String,
    pub geo_base_url: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>, weather_base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            weather_base_url: weather_base_url.into(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Shorten an upstream body before it goes into a log line.
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_public_geocoder() {
        let settings = ProviderSettings::new("KEY", "http://upstream/data/2.5");
        assert_eq!(settings.geo_base_url, DEFAULT_GEO_BASE_URL);
        assert_eq!(settings.timeout, Duration::from_secs(5));
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let body = "é".repeat(300);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }
}
