//! Building the ordered list of backend base URLs a client should try.

use serde::{Deserialize, Serialize};

/// Loopback alias the Android emulator exposes for the host machine.
pub const ANDROID_EMULATOR_HOST: &str = "10.0.2.2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    #[default]
    Desktop,
}

/// Where the client runs and which addresses the backend may be reachable at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointEnvironment {
    /// Fully qualified production base URL, including the API prefix.
    pub production_url: Option<String>,
    /// Host or IP of the development machine on the local network.
    pub lan_host: Option<String>,
    pub platform: Platform,
    pub is_emulator: bool,
    pub port: u16,
    /// Path prefix the proxy mounts its API under.
    pub api_prefix: String,
}

impl Default for EndpointEnvironment {
    fn default() -> Self {
        Self {
            production_url: None,
            lan_host: None,
            platform: Platform::default(),
            is_emulator: false,
            port: 3000,
            api_prefix: "/api".to_string(),
        }
    }
}

impl EndpointEnvironment {
    fn local_url(&self, host: &str) -> String {
        let prefix = self.api_prefix.trim_end_matches('/');
        format!("http://{host}:{}{prefix}", self.port)
    }
}

/// Candidate base URLs in preference order: production, LAN, emulator
/// loopback, localhost. Duplicates are dropped, keeping the first position.
pub fn candidate_base_urls(env: &EndpointEnvironment) -> Vec<String> {
    let mut urls = Vec::with_capacity(4);

    if let Some(prod) = env.production_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        urls.push(prod.trim_end_matches('/').to_string());
    }
    if let Some(lan) = env.lan_host.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        urls.push(env.local_url(lan));
    }
    if env.platform == Platform::Android && env.is_emulator {
        urls.push(env.local_url(ANDROID_EMULATOR_HOST));
    }
    urls.push(env.local_url("localhost"));

    let mut seen = std::collections::HashSet::new();
    urls.retain(|u| seen.insert(u.clone()));
    urls
}
