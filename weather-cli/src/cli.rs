use anyhow::{Context, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Select, Text};
use std::time::Duration;
use weather_core::{
    CityQuery, ClientConfig,
    client::{SubmitOutcome, SuggestionState, WeatherSession},
    model::MIN_SUGGESTION_QUERY_LEN,
};

use crate::render;

/// How long to wait for a suggestion list before giving up on it.
const SUGGESTION_WAIT: Duration = Duration::from_secs(15);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI for the weather proxy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure backend addresses and timeouts.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name, e.g. "London" or "Springfield, Illinois, US".
        city: String,
    },

    /// List city suggestions for a partial name.
    Suggest {
        /// At least two characters of a city name.
        text: String,
    },

    /// Probe the configured backend addresses and report the one in use.
    Probe {
        /// Move the working address to the front of the saved candidate list.
        #[arg(long)]
        save: bool,
    },

    /// Search interactively, picking from live suggestions.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
            Command::Suggest { text } => suggest(&text).await,
            Command::Probe { save } => probe(save).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn open_session(config: &ClientConfig) -> anyhow::Result<WeatherSession> {
    WeatherSession::from_config(config).context("Failed to set up the HTTP client")
}

/// Print the result of a submit. Returns an error when nothing was shown.
fn report(session: &WeatherSession, outcome: SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::Completed(weather) => {
            println!("{}", render::weather_card(&weather, chrono::Local::now()));
            Ok(())
        }
        SubmitOutcome::Failed(_) => {
            let view = session.snapshot();
            let text = view
                .error
                .as_ref()
                .map(render::notice)
                .unwrap_or_else(|| "Error: request failed".to_string());
            Err(anyhow!(text))
        }
        SubmitOutcome::Skipped => Err(anyhow!("Please enter a city name.")),
        SubmitOutcome::Superseded | SubmitOutcome::Cancelled => Ok(()),
    }
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = ClientConfig::load()?;
    let session = open_session(&config)?;

    session.set_text(city);
    let outcome = session.submit().await;
    let result = report(&session, outcome);
    session.shutdown();
    result
}

/// Feed `text` to the session and wait for the suggestion list for that text.
async fn fetch_suggestions(session: &WeatherSession, text: &str) -> SuggestionState {
    let mut rx = session.subscribe_suggestions();
    session.set_text(text);

    let Ok(query) = CityQuery::for_suggestions(text) else {
        return SuggestionState::Cleared;
    };

    let settled = tokio::time::timeout(SUGGESTION_WAIT, async {
        loop {
            let state = rx.borrow_and_update().clone();
            if let SuggestionState::Ready { query: answered, .. } = &state {
                if answered == query.query() {
                    return state;
                }
            }
            if rx.changed().await.is_err() {
                return SuggestionState::Cleared;
            }
        }
    })
    .await;

    settled.unwrap_or(SuggestionState::Cleared)
}

async fn suggest(text: &str) -> anyhow::Result<()> {
    if CityQuery::for_suggestions(text).is_err() {
        bail!("Type at least {MIN_SUGGESTION_QUERY_LEN} characters to get suggestions.");
    }

    let config = ClientConfig::load()?;
    let session = open_session(&config)?;

    // Suggestions go to whatever address is active; find a live one first.
    if let Err(err) = session.resolver().probe().await {
        tracing::warn!(error = %err, "no candidate answered, using the default address");
    }

    let state = fetch_suggestions(&session, text).await;
    println!("{}", render::suggestions(&state));
    session.shutdown();
    Ok(())
}

async fn probe(save: bool) -> anyhow::Result<()> {
    let mut config = ClientConfig::load()?;
    let session = open_session(&config)?;
    let resolver = session.resolver();

    println!("Candidates, in order:");
    for candidate in resolver.candidates() {
        println!("  {candidate}");
    }

    match resolver.probe().await {
        Ok(url) => {
            println!("Using {url}");
            if save {
                config.prefer_candidate(&url);
                config.save()?;
                println!("Saved {url} as the preferred address.");
            }
            Ok(())
        }
        Err(err) => Err(anyhow!(err.user_message())),
    }
}

/// `None` when the user backed out of the prompt.
fn prompt_or_quit<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let config = ClientConfig::load()?;
    let session = open_session(&config)?;

    if let Err(err) = session.resolver().probe().await {
        println!("{}", err.user_message());
    }

    loop {
        let Some(text) = prompt_or_quit(
            Text::new("City:").with_help_message("Leave empty to quit").prompt(),
        )?
        else {
            break;
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            break;
        }

        let state = fetch_suggestions(&session, &text).await;
        let matches = state.suggestions().to_vec();

        let outcome = if matches.is_empty() {
            session.submit().await
        } else {
            let as_typed = format!("Search \"{text}\" as typed");
            let mut options: Vec<String> = matches.iter().map(|s| s.label()).collect();
            options.push(as_typed);

            let Some(choice) = prompt_or_quit(Select::new("Pick a city:", options).raw_prompt())?
            else {
                continue;
            };
            match matches.get(choice.index) {
                Some(suggestion) => session.select_suggestion(suggestion).await,
                None => session.submit().await,
            }
        };

        if let Err(err) = report(&session, outcome) {
            println!("{err}");
        }
        println!();
    }

    session.shutdown();
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = ClientConfig::load()?;

    let current = config.effective_candidates().join(", ");
    let candidates = Text::new("Backend base URLs, in preference order (comma-separated):")
        .with_default(&current)
        .with_help_message("e.g. https://weather.example.com/api, http://192.168.1.20:3000/api")
        .prompt()?;

    config.candidates = candidates
        .split(',')
        .map(|c| c.trim().trim_end_matches('/').to_string())
        .filter(|c| !c.is_empty())
        .collect();
    if config.candidates.is_empty() {
        bail!("At least one backend URL is required");
    }

    config.probe_timeout_ms = CustomType::<u64>::new("Probe timeout (ms):")
        .with_default(config.probe_timeout_ms)
        .prompt()?;
    config.request_timeout_ms = CustomType::<u64>::new("Request timeout (ms):")
        .with_default(config.request_timeout_ms)
        .prompt()?;
    config.debounce_ms = CustomType::<u64>::new("Suggestion delay (ms):")
        .with_default(config.debounce_ms)
        .prompt()?;

    config.save()?;
    println!("Saved configuration to {}", ClientConfig::config_file_path()?.display());

    Ok(())
}
