use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use thiserror::Error;
use weather_core::{ProviderSettings, provider::DEFAULT_GEO_BASE_URL};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for environment variable {name}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
        }
    }
}

/// Which `Origin`s may read responses cross-origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    AnyOrigin,
    AllowList(Vec<String>),
}

impl CorsPolicy {
    pub fn allows(&self, origin: &str) -> bool {
        match self {
            CorsPolicy::AnyOrigin => true,
            CorsPolicy::AllowList(list) => list.iter().any(|o| o == origin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { window: Duration::from_secs(15 * 60), max_requests: 100 }
    }
}

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct ServerConfig {
    pub api_key: String,
    pub weather_base_url: String,
    pub geo_base_url: String,
    pub bind_addr: SocketAddr,
    pub env: AppEnv,
    pub cors: CorsPolicy,
    pub rate_limit: RateLimitConfig,
    pub body_limit_bytes: usize,
    pub upstream_timeout: Duration,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("api_key", &"<redacted>")
            .field("weather_base_url", &self.weather_base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("bind_addr", &self.bind_addr)
            .field("env", &self.env)
            .field("cors", &self.cors)
            .field("rate_limit", &self.rate_limit)
            .field("body_limit_bytes", &self.body_limit_bytes)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Settings suitable for tests: development mode, default limits.
    pub fn new(api_key: impl Into<String>, weather_base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            weather_base_url: weather_base_url.into(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000),
            env: AppEnv::Development,
            cors: CorsPolicy::AnyOrigin,
            rate_limit: RateLimitConfig::default(),
            body_limit_bytes: 10 * 1024,
            upstream_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("WEATHER_API_KEY").ok_or(ConfigError::Missing("WEATHER_API_KEY"))?;
        let weather_base_url =
            get("WEATHER_BASE_URL").ok_or(ConfigError::Missing("WEATHER_BASE_URL"))?;

        let mut config = Self::new(api_key, weather_base_url);

        if let Some(geo) = get("GEO_BASE_URL") {
            config.geo_base_url = geo;
        }

        let port: u16 = parse_or(&get, "PORT", 3000)?;
        let host: IpAddr = parse_or(&get, "BIND_ADDR", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        config.bind_addr = SocketAddr::new(host, port);

        config.env = match get("APP_ENV").as_deref() {
            None | Some("development") => AppEnv::Development,
            Some("production") => AppEnv::Production,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "APP_ENV", value: other.to_string() });
            }
        };

        config.cors = match config.env {
            AppEnv::Development => CorsPolicy::AnyOrigin,
            AppEnv::Production => CorsPolicy::AllowList(
                get("CORS_ORIGINS")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|o| !o.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
            ),
        };

        let window_secs: u64 = parse_or(&get, "RATE_LIMIT_WINDOW_SECS", 15 * 60)?;
        let max_requests: u32 = parse_or(&get, "RATE_LIMIT_MAX", 100)?;
        if window_secs == 0 {
            return Err(ConfigError::Invalid { name: "RATE_LIMIT_WINDOW_SECS", value: "0".into() });
        }
        config.rate_limit = RateLimitConfig { window: Duration::from_secs(window_secs), max_requests };

        config.body_limit_bytes = parse_or(&get, "BODY_LIMIT_BYTES", 10 * 1024)?;
        config.upstream_timeout = Duration::from_secs(parse_or(&get, "UPSTREAM_TIMEOUT_SECS", 5)?);

        Ok(config)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            api_key: self.api_key.clone(),
            weather_base_url: self.weather_base_url.clone(),
            geo_base_url: self.geo_base_url.clone(),
            timeout: self.upstream_timeout,
        }
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
