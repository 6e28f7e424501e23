//! Core library for the weather proxy and its clients.
//!
//! This crate defines:
//! - Shared domain models (queries, results, suggestions)
//! - Parameter validation & sanitization used by the proxy
//! - Abstraction over the upstream weather provider
//! - The client query layer (connectivity resolver, debounced suggestions,
//!   weather-fetch session) and its on-disk configuration
//!
//! It is used by `weather-server` and `weather-cli`.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod params;
pub mod provider;

pub use config::ClientConfig;
pub use error::{ClientError, ProviderError};
pub use model::{CityQuery, CitySuggestion, ValidationError, WeatherQuery, WeatherResult};
pub use provider::{OpenWeatherProvider, ProviderSettings, WeatherProvider};
