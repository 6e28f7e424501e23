use chrono::{DateTime, Local};
use weather_core::{
    WeatherResult,
    client::{ErrorNotice, SuggestionOutcome, SuggestionState},
};

/// Multi-line weather card.
pub fn weather_card(weather: &WeatherResult, fetched_at: DateTime<Local>) -> String {
    format!(
        "{city}, {country}\n  {temp:.1}°C, {desc}\n  Humidity: {hum}%\n  Wind: {wind:.1} m/s\n  Icon: {icon}\n  Fetched at {at}",
        city = weather.city,
        country = weather.country,
        temp = weather.temperature,
        desc = weather.description,
        hum = weather.humidity,
        wind = weather.wind_speed,
        icon = weather.icon_url(),
        at = fetched_at.format("%H:%M:%S"),
    )
}

pub fn notice(notice: &ErrorNotice) -> String {
    match notice {
        ErrorNotice::Connectivity(msg) => format!("Connection error: {msg}"),
        ErrorNotice::Fetch(msg) => format!("Error: {msg}"),
    }
}

/// One suggestion label per line, or a short note when there are none.
/// A failed lookup reads the same as an empty one.
pub fn suggestions(state: &SuggestionState) -> String {
    match state {
        SuggestionState::Cleared => "No suggestions.".to_string(),
        SuggestionState::Ready { outcome, query } => {
            if let SuggestionOutcome::Failed(reason) = outcome {
                tracing::debug!(%query, %reason, "suggestion lookup failed");
            }
            let list = outcome.suggestions();
            if list.is_empty() {
                return format!("No cities match \"{query}\".");
            }
            list.iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {}", i + 1, s.label()))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}
