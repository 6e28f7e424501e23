#![allow(dead_code)]

use async_trait::async_trait;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::Mutex};
use weather_core::{CitySuggestion, ProviderError, WeatherProvider, WeatherResult};
use weather_server::{AppState, ServerConfig, build_router};

/// Upstream stand-in that records what the proxy forwarded.
#[derive(Debug, Default)]
pub struct FakeProvider {
    pub cities_seen: Mutex<Vec<String>>,
    pub queries_seen: Mutex<Vec<(String, usize)>>,
    pub fail: bool,
}

impl FakeProvider {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }
}

#[async_trait]
impl WeatherProvider for FakeProvider {
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, ProviderError> {
        self.cities_seen.lock().await.push(city.to_string());
        if self.fail {
            return Err(ProviderError::Status {
                status: 401,
                body: r#"{"cod":401,"message":"Invalid API key sk-upstream-secret"}"#.to_string(),
            });
        }

        Ok(WeatherResult {
            temperature: 12.3,
            description: "light rain".to_string(),
            humidity: 81,
            wind_speed: 5.4,
            icon: "10d".to_string(),
            city: city.to_string(),
            country: "US".to_string(),
        })
    }

    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, ProviderError> {
        self.queries_seen.lock().await.push((query.to_string(), limit));
        if self.fail {
            return Err(ProviderError::Timeout);
        }

        // Deliberately more than the proxy is allowed to return.
        Ok((0..8)
            .map(|i| CitySuggestion {
                name: format!("{query}{i}"),
                country: "GB".to_string(),
                state: (i % 2 == 0).then(|| "England".to_string()),
            })
            .collect())
    }
}

/// Provider whose weather lookup blows up inside the handler.
#[derive(Debug, Default)]
pub struct PanickingProvider;

#[async_trait]
impl WeatherProvider for PanickingProvider {
    async fn current_weather(&self, _city: &str) -> Result<WeatherResult, ProviderError> {
        panic!("upstream payload had an unexpected shape");
    }

    async fn search_cities(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<Vec<CitySuggestion>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Client for talking to the spawned app, ignoring any proxy in the environment.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().expect("http client")
}

pub fn test_config() -> ServerConfig {
    ServerConfig::new("TEST_KEY", "http://upstream.invalid/data/2.5")
}

pub struct TestApp {
    pub addr: SocketAddr,
    pub provider: Arc<FakeProvider>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

pub async fn spawn_app(config: ServerConfig, provider: FakeProvider) -> TestApp {
    let provider = Arc::new(provider);
    let addr = serve(config, provider.clone()).await;
    TestApp { addr, provider }
}

/// Serve the router over any provider on an ephemeral port.
pub async fn serve(config: ServerConfig, provider: Arc<dyn WeatherProvider>) -> SocketAddr {
    let app = build_router(AppState::new(config, provider));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
            .await
            .expect("serve app")
    });

    addr
}
