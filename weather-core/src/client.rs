//! Client query layer: finding a reachable backend, debounced city
//! suggestions, and the weather-fetch session that ties them together.

pub mod backend;
pub mod endpoints;
pub mod resolver;
pub mod session;
pub mod suggest;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{HttpBackend, WeatherBackend};
pub use endpoints::{EndpointEnvironment, Platform, candidate_base_urls};
pub use resolver::ConnectivityResolver;
pub use session::{ErrorNotice, SubmitOutcome, ViewState, WeatherSession};
pub use suggest::{SuggestionFetcher, SuggestionOutcome, SuggestionState};
