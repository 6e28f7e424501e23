//! Scripted in-memory backend for client-layer tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use crate::{
    client::backend::WeatherBackend,
    error::ClientError,
    model::{CityQuery, CitySuggestion, WeatherQuery, WeatherResult},
};

#[derive(Debug, Default)]
pub struct FakeBackend {
    reachable: Mutex<HashSet<String>>,
    pinged: Mutex<Vec<String>>,
    weather_calls: Mutex<Vec<(String, String)>>,
    city_calls: Mutex<Vec<String>>,
    weather_delays: Mutex<HashMap<String, Duration>>,
    failing_cities: Mutex<HashSet<String>>,
    fail_suggestions: Mutex<bool>,
    city_delay: Mutex<Duration>,
}

impl FakeBackend {
    pub fn reachable(urls: &[&str]) -> Self {
        let backend = Self::default();
        backend.set_reachable(urls);
        backend
    }

    pub fn set_reachable(&self, urls: &[&str]) {
        *self.reachable.lock() = urls.iter().map(|u| u.to_string()).collect();
    }

    pub fn pinged(&self) -> Vec<String> {
        self.pinged.lock().clone()
    }

    /// `(base_url, city)` for every weather call, in arrival order.
    pub fn weather_calls(&self) -> Vec<(String, String)> {
        self.weather_calls.lock().clone()
    }

    pub fn city_calls(&self) -> Vec<String> {
        self.city_calls.lock().clone()
    }

    pub fn delay_weather(&self, city: &str, delay: Duration) {
        self.weather_delays.lock().insert(city.to_string(), delay);
    }

    pub fn fail_weather(&self, city: &str) {
        self.failing_cities.lock().insert(city.to_string());
    }

    pub fn fail_suggestions(&self, fail: bool) {
        *self.fail_suggestions.lock() = fail;
    }

    pub fn delay_suggestions(&self, delay: Duration) {
        *self.city_delay.lock() = delay;
    }

    pub fn weather_for(city: &str) -> WeatherResult {
        WeatherResult {
            temperature: 20.0,
            description: format!("clear over {city}"),
            humidity: 50,
            wind_speed: 2.5,
            icon: "01d".to_string(),
            city: city.to_string(),
            country: "XX".to_string(),
        }
    }
}

#[async_trait]
impl WeatherBackend for FakeBackend {
    async fn ping(&self, base_url: &str, _timeout: Duration) -> Result<(), ClientError> {
        self.pinged.lock().push(base_url.to_string());
        if self.reachable.lock().contains(base_url) {
            Ok(())
        } else {
            Err(ClientError::Transport(format!("connection refused: {base_url}")))
        }
    }

    async fn weather(
        &self,
        base_url: &str,
        query: &WeatherQuery,
    ) -> Result<WeatherResult, ClientError> {
        let city = query.city().to_string();
        self.weather_calls.lock().push((base_url.to_string(), city.clone()));

        let delay = self.weather_delays.lock().get(&city).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if !self.reachable.lock().contains(base_url) {
            return Err(ClientError::Transport(format!("connection refused: {base_url}")));
        }
        if self.failing_cities.lock().contains(&city) {
            return Err(ClientError::Status {
                status: 500,
                message: "Failed to fetch weather data".to_string(),
            });
        }

        Ok(Self::weather_for(&city))
    }

    async fn cities(
        &self,
        _base_url: &str,
        query: &CityQuery,
    ) -> Result<Vec<CitySuggestion>, ClientError> {
        self.city_calls.lock().push(query.query().to_string());

        let delay = *self.city_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if *self.fail_suggestions.lock() {
            return Err(ClientError::Status { status: 500, message: "boom".to_string() });
        }

        Ok(vec![
            CitySuggestion {
                name: format!("{}ton", query.query()),
                country: "GB".to_string(),
                state: Some("England".to_string()),
            },
            CitySuggestion {
                name: format!("{}ville", query.query()),
                country: "US".to_string(),
                state: None,
            },
        ])
    }
}
