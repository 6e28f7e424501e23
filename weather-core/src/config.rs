use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::client::{
    endpoints::{EndpointEnvironment, candidate_base_urls},
    resolver::DEFAULT_PROBE_TIMEOUT,
    suggest::DEFAULT_DEBOUNCE,
};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// candidates = ["https://weather.example.com/api", "http://192.168.1.20:3000/api"]
/// probe_timeout_ms = 3000
///
/// [environment]
/// platform = "android"
/// is_emulator = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Explicit base URLs, in preference order. When empty the list is
    /// derived from `environment`.
    pub candidates: Vec<String>,

    /// Used until a probe succeeds. Falls back to the first candidate.
    pub default_base_url: Option<String>,

    pub environment: EndpointEnvironment,

    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            default_base_url: None,
            environment: EndpointEnvironment::default(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl ClientConfig {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-proxy", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Candidate base URLs: the explicit list if given, otherwise derived from
    /// the environment descriptor.
    pub fn effective_candidates(&self) -> Vec<String> {
        let explicit: Vec<String> = self
            .candidates
            .iter()
            .map(|c| c.trim().trim_end_matches('/').to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if explicit.is_empty() { candidate_base_urls(&self.environment) } else { explicit }
    }

    pub fn effective_default_base_url(&self) -> String {
        self.default_base_url
            .clone()
            .or_else(|| self.effective_candidates().into_iter().next())
            .unwrap_or_else(|| "http://localhost:3000/api".to_string())
    }

    /// Insert a candidate at the front, keeping the rest in order.
    pub fn prefer_candidate(&mut self, url: &str) {
        let url = url.trim().trim_end_matches('/').to_string();
        self.candidates.retain(|c| c.trim_end_matches('/') != url);
        self.candidates.insert(0, url);
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::endpoints::Platform;

    #[test]
    fn defaults_match_documented_timings() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.debounce(), Duration::from_millis(300));
    }

    #[test]
    fn empty_candidates_fall_back_to_environment() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.effective_candidates(), vec!["http://localhost:3000/api"]);
        assert_eq!(cfg.effective_default_base_url(), "http://localhost:3000/api");
    }

    #[test]
    fn explicit_candidates_win_over_environment() {
        let cfg = ClientConfig {
            candidates: vec!["https://a.example/api/".into(), "  ".into(), "http://b:3000/api".into()],
            ..ClientConfig::default()
        };
        assert_eq!(cfg.effective_candidates(), vec!["https://a.example/api", "http://b:3000/api"]);
        assert_eq!(cfg.effective_default_base_url(), "https://a.example/api");
    }

    #[test]
    fn prefer_candidate_moves_to_front_without_duplicates() {
        let mut cfg = ClientConfig {
            candidates: vec!["http://a/api".into(), "http://b/api".into()],
            ..ClientConfig::default()
        };
        cfg.prefer_candidate("http://b/api/");
        assert_eq!(cfg.candidates, vec!["http://b/api", "http://a/api"]);
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = ClientConfig::from_toml(
            r#"
            debounce_ms = 150

            [environment]
            platform = "android"
            is_emulator = true
            lan_host = "192.168.0.7"
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.debounce(), Duration::from_millis(150));
        assert_eq!(cfg.probe_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.environment.platform, Platform::Android);
        assert_eq!(
            cfg.effective_candidates(),
            vec!["http://192.168.0.7:3000/api", "http://10.0.2.2:3000/api", "http://localhost:3000/api"]
        );
    }

    #[test]
    fn toml_roundtrip_preserves_values() {
        let mut cfg = ClientConfig::default();
        cfg.prefer_candidate("https://weather.example.com/api");
        cfg.default_base_url = Some("http://localhost:3000/api".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), cfg);
    }
}
