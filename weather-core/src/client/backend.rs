use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use std::{fmt::Debug, time::Duration};

use crate::{
    error::ClientError,
    model::{CityQuery, CitySuggestion, WeatherQuery, WeatherResult},
    provider::truncate_body,
};

/// The proxy's HTTP surface as seen from the client. Every call takes the base
/// URL explicitly so one instance can serve every candidate address.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    /// Liveness probe against `{base_url}/test`.
    async fn ping(&self, base_url: &str, timeout: Duration) -> Result<(), ClientError>;

    async fn weather(
        &self,
        base_url: &str,
        query: &WeatherQuery,
    ) -> Result<WeatherResult, ClientError>;

    async fn cities(
        &self,
        base_url: &str,
        query: &CityQuery,
    ) -> Result<Vec<CitySuggestion>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `reqwest`-backed implementation of [`WeatherBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
}

impl HttpBackend {
    pub fn new(request_timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { http })
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| truncate_body(&body));
            return Err(ClientError::Status { status: status.as_u16(), message });
        }

        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{path}", base_url.trim_end_matches('/'))
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn ping(&self, base_url: &str, timeout: Duration) -> Result<(), ClientError> {
        let res = self.http.get(endpoint(base_url, "test")).timeout(timeout).send().await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: "liveness probe rejected".to_string(),
            });
        }

        Ok(())
    }

    async fn weather(
        &self,
        base_url: &str,
        query: &WeatherQuery,
    ) -> Result<WeatherResult, ClientError> {
        let res = self
            .http
            .get(endpoint(base_url, "weather"))
            .query(&[("city", query.city())])
            .send()
            .await?;

        Self::decode(res).await
    }

    async fn cities(
        &self,
        base_url: &str,
        query: &CityQuery,
    ) -> Result<Vec<CitySuggestion>, ClientError> {
        let res = self
            .http
            .get(endpoint(base_url, "cities"))
            .query(&[("query", query.query())])
            .send()
            .await?;

        Self::decode(res).await
    }
}
