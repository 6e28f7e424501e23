use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum trimmed length before the client asks for city suggestions.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("city must not be empty")]
    EmptyCity,

    #[error("query must not be empty")]
    EmptyQuery,

    #[error("query must be at least {MIN_SUGGESTION_QUERY_LEN} characters")]
    QueryTooShort,
}

/// A request for current conditions in a single city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    city: String,
}

impl WeatherQuery {
    pub fn new(city: &str) -> Result<Self, ValidationError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ValidationError::EmptyCity);
        }

        Ok(Self { city: city.to_string() })
    }

    pub fn city(&self) -> &str {
        &self.city
    }
}

/// A geocoding lookup for partially typed city names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityQuery {
    query: String,
}

impl CityQuery {
    /// Accepts any non-blank text. The backend uses this form.
    pub fn new(query: &str) -> Result<Self, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        Ok(Self { query: query.to_string() })
    }

    /// Stricter form used by the client before it issues a suggestion fetch.
    pub fn for_suggestions(query: &str) -> Result<Self, ValidationError> {
        let parsed = Self::new(query)?;
        if parsed.query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return Err(ValidationError::QueryTooShort);
        }

        Ok(parsed)
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

/// Current conditions as served by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResult {
    /// Degrees Celsius.
    pub temperature: f64,
    pub description: String,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Metres per second.
    pub wind_speed: f64,
    /// Provider icon code, e.g. `"01d"`.
    pub icon: String,
    pub city: String,
    pub country: String,
}

impl WeatherResult {
    /// URL of the provider's rendered icon for this result.
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySuggestion {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl CitySuggestion {
    /// `"City, State, Country"`, or `"City, Country"` when there is no state.
    pub fn label(&self) -> String {
        match self.state.as_deref().filter(|s| !s.is_empty()) {
            Some(state) => format!("{}, {}, {}", self.name, state, self.country),
            None => format!("{}, {}", self.name, self.country),
        }
    }
}
