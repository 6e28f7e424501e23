use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::ProviderError,
    model::{CitySuggestion, WeatherResult},
    provider::{ProviderSettings, truncate_body},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    weather_base_url: String,
    geo_base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            api_key: settings.api_key,
            weather_base_url: settings.weather_base_url.trim_end_matches('/').to_string(),
            geo_base_url: settings.geo_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ProviderError> {
        let res = self.http.get(url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

impl From<OwCurrentResponse> for WeatherResult {
    fn from(parsed: OwCurrentResponse) -> Self {
        let (description, icon) = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        WeatherResult {
            temperature: parsed.main.temp,
            description,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            icon,
            city: parsed.name,
            country: parsed.sys.country,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoEntry {
    name: String,
    country: String,
    state: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, city: &str) -> Result<WeatherResult, ProviderError> {
        let url = format!("{}/weather", self.weather_base_url);
        let body = self
            .get_text(&url, &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .await?;

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(city, upstream_name = %parsed.name, "decoded current weather");
        Ok(parsed.into())
    }

    async fn search_cities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<CitySuggestion>, ProviderError> {
        let url = format!("{}/direct", self.geo_base_url);
        let limit_str = limit.to_string();
        let body = self
            .get_text(
                &url,
                &[("q", query), ("limit", limit_str.as_str()), ("appid", self.api_key.as_str())],
            )
            .await?;

        let parsed: Vec<OwGeoEntry> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(parsed
            .into_iter()
            .take(limit)
            .map(|e| CitySuggestion { name: e.name, country: e.country, state: e.state })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        let mut settings = ProviderSettings::new("TEST_KEY", format!("{}/data/2.5", server.uri()));
        settings.geo_base_url = format!("{}/geo/1.0/", server.uri());
        OpenWeatherProvider::new(settings).unwrap()
    }

    #[tokio::test]
    async fn current_weather_is_flattened() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("q", "New York"))
            .and(query_param("appid", "TEST_KEY"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "New York",
                "main": { "temp": 18.4, "feels_like": 17.9, "humidity": 62 },
                "weather": [{ "description": "few clouds", "icon": "02d" }],
                "wind": { "speed": 4.1 },
                "sys": { "country": "US" }
            })))
            .mount(&server)
            .await;

        let result = provider_for(&server).current_weather("New York").await.unwrap();

        assert_eq!(result.city, "New York");
        assert_eq!(result.country, "US");
        assert_eq!(result.description, "few clouds");
        assert_eq!(result.icon, "02d");
        assert_eq!(result.humidity, 62);
        assert!((result.temperature - 18.4).abs() < f64::EPSILON);
        assert!((result.wind_speed - 4.1).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "cod": "404", "message": "city not found" })),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server).current_weather("Atlantis").await.unwrap_err();
        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider_for(&server).current_weather("Paris").await.unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn search_cities_maps_and_caps_results() {
        let server = MockServer::start().await;
        let entries: Vec<_> = (0..7)
            .map(|i| json!({ "name": format!("London{i}"), "country": "GB", "lat": 51.5, "lon": -0.1 }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lon"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries))
            .mount(&server)
            .await;

        let found = provider_for(&server).search_cities("Lon", 5).await.unwrap();

        assert_eq!(found.len(), 5);
        assert_eq!(found[0].name, "London0");
        assert_eq!(found[4].name, "London4");
        assert!(found.iter().all(|c| c.state.is_none()));
    }

    #[tokio::test]
    async fn search_cities_keeps_state_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "London", "country": "CA", "state": "Ontario" }
            ])))
            .mount(&server)
            .await;

        let found = provider_for(&server).search_cities("London", 5).await.unwrap();
        assert_eq!(found[0].state.as_deref(), Some("Ontario"));
    }
}
