use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body for every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors a handler or middleware turns into an HTTP response. Messages are
/// fixed strings so upstream details never reach the client.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid city parameter")]
    InvalidCity,

    #[error("Invalid query parameter")]
    InvalidQuery,

    #[error("Failed to fetch weather data")]
    WeatherUpstream,

    #[error("Failed to fetch city suggestions")]
    CitiesUpstream,

    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Not found")]
    NotFound,

    #[error("Something went wrong!")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCity | ApiError::InvalidQuery => StatusCode::BAD_REQUEST,
            ApiError::WeatherUpstream | ApiError::CitiesUpstream => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
