use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};
use weather_core::{
    CitySuggestion,
    params::{ParamCheck, check_location_param},
    provider::CITY_SUGGESTION_LIMIT,
};

use crate::{error::ApiError, state::AppState};

const WEATHER_CACHE_CONTROL: &str = "public, max-age=300";
const CITIES_CACHE_CONTROL: &str = "public, max-age=3600";

/// Raw query string pairs, so repeated keys can be told apart from single ones.
type RawParams = Query<Vec<(String, String)>>;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
}

fn liveness(message: &'static str) -> Json<Liveness> {
    Json(Liveness { status: "OK", message, timestamp: chrono::Utc::now().to_rfc3339() })
}

fn values_of<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    params.iter().filter(|(k, _)| k == key).map(|(_, v)| v.as_str()).collect()
}

pub async fn root() -> Json<Liveness> {
    info!("health check endpoint accessed");
    liveness("Weather API is running")
}

pub async fn test() -> Json<Liveness> {
    info!("test endpoint accessed");
    liveness("Backend is reachable")
}

pub async fn weather(
    State(state): State<AppState>,
    Query(params): RawParams,
) -> Result<Response, ApiError> {
    let raw = values_of(&params, "city");
    let city = match check_location_param(&raw) {
        ParamCheck::Valid(city) => city,
        _ => {
            warn!(city = ?raw, "invalid city parameter received");
            return Err(ApiError::InvalidCity);
        }
    };
    info!(%city, "fetching weather data");

    let result = state.provider.current_weather(&city).await.map_err(|err| {
        error!(%city, error = %err, "error fetching weather data");
        ApiError::WeatherUpstream
    })?;

    info!(%city, "successfully fetched weather data");
    Ok(([(header::CACHE_CONTROL, WEATHER_CACHE_CONTROL)], Json(result)).into_response())
}

pub async fn cities(
    State(state): State<AppState>,
    Query(params): RawParams,
) -> Result<Response, ApiError> {
    let raw = values_of(&params, "query");
    let query = match check_location_param(&raw) {
        ParamCheck::Valid(query) => query,
        ParamCheck::Missing | ParamCheck::Stripped => {
            return Ok(Json(Vec::<CitySuggestion>::new()).into_response());
        }
        ParamCheck::Invalid => {
            warn!(query = ?raw, "invalid query parameter received");
            return Err(ApiError::InvalidQuery);
        }
    };
    info!(%query, "searching cities");

    let mut found = state
        .provider
        .search_cities(&query, CITY_SUGGESTION_LIMIT)
        .await
        .map_err(|err| {
            error!(%query, error = %err, "error fetching city suggestions");
            ApiError::CitiesUpstream
        })?;
    found.truncate(CITY_SUGGESTION_LIMIT);

    info!(%query, count = found.len(), "found city suggestions");
    Ok(([(header::CACHE_CONTROL, CITIES_CACHE_CONTROL)], Json(found)).into_response())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
