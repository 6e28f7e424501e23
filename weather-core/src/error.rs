//! Typed errors shared by the provider and client layers.

use thiserror::Error;

use crate::model::ValidationError;

/// Failure talking to the upstream weather or geocoding API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream request failed: {0}")]
    Network(String),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream response could not be decoded: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Failure seen by the client query layer when talking to the proxy.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No configured backend candidate answered a liveness probe.
    #[error("unable to reach the weather backend at any configured address")]
    Connectivity,

    #[error("backend request timed out")]
    Timeout,

    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("backend response could not be decoded: {0}")]
    Decode(String),

    #[error("request was cancelled")]
    Cancelled,
}

impl ClientError {
    /// True when the failure says nothing about the data and everything about
    /// reachability, so the next call should re-probe.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ClientError::Connectivity | ClientError::Timeout | ClientError::Transport(_)
        )
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::Connectivity => {
                "Cannot connect to the weather server. Check your network connection."
            }
            ClientError::Validation(_) => "Please enter a city name.",
            ClientError::Status { status: 400, .. } => "That city name is not valid.",
            ClientError::Status { status: 429, .. } => {
                "Too many requests. Please wait a moment and try again."
            }
            _ => "Failed to fetch weather data. Please try again.",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
