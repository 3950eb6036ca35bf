//! Runtime configuration for the lyrics engine.
//!
//! Everything is optional: `Config::from_env` falls back to the public
//! endpoints of both sources and the default timeouts, so an empty
//! environment yields a working setup (without metadata enrichment).

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use url::Url;

/// Environment variable names.
pub const ENV_GENIUS_ACCESS_TOKEN: &str = "GENIUS_ACCESS_TOKEN";
pub const ENV_AGGREGATOR_URL: &str = "LYRICS_AGGREGATOR_URL";
pub const ENV_AGGREGATOR_API_URL: &str = "LYRICS_AGGREGATOR_API_URL";
pub const ENV_REGIONAL_URL: &str = "LYRICS_REGIONAL_URL";
pub const ENV_SEARCH_TIMEOUT_SECS: &str = "LYRICS_SEARCH_TIMEOUT_SECS";
pub const ENV_PAGE_TIMEOUT_SECS: &str = "LYRICS_PAGE_TIMEOUT_SECS";
pub const ENV_METADATA_TIMEOUT_SECS: &str = "LYRICS_METADATA_TIMEOUT_SECS";
pub const ENV_COURTESY_DELAY_MS: &str = "LYRICS_COURTESY_DELAY_MS";
pub const ENV_SAMPLE_METADATA: &str = "LYRICS_SAMPLE_METADATA";

const DEFAULT_AGGREGATOR_URL: &str = "https://genius.com/";
const DEFAULT_AGGREGATOR_API_URL: &str = "https://api.genius.com/";
const DEFAULT_REGIONAL_URL: &str = "https://www.sinhalasongbook.com/";
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 15;
const DEFAULT_METADATA_TIMEOUT_SECS: u64 = 10;
const DEFAULT_COURTESY_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    access_token: Option<String>,
    aggregator_url: Url,
    aggregator_api_url: Url,
    regional_url: Url,
    search_timeout: Duration,
    page_timeout: Duration,
    metadata_timeout: Duration,
    courtesy_delay: Duration,
    sample_metadata: bool,
}

impl Config {
    /// Load from environment variables, falling back to defaults. Values that
    /// are present but unparsable are an error rather than silently ignored.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            access_token: env::var(ENV_GENIUS_ACCESS_TOKEN)
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            aggregator_url: url_var(ENV_AGGREGATOR_URL)?.unwrap_or(defaults.aggregator_url),
            aggregator_api_url: url_var(ENV_AGGREGATOR_API_URL)?
                .unwrap_or(defaults.aggregator_api_url),
            regional_url: url_var(ENV_REGIONAL_URL)?.unwrap_or(defaults.regional_url),
            search_timeout: number_var(ENV_SEARCH_TIMEOUT_SECS)?
                .map_or(defaults.search_timeout, Duration::from_secs),
            page_timeout: number_var(ENV_PAGE_TIMEOUT_SECS)?
                .map_or(defaults.page_timeout, Duration::from_secs),
            metadata_timeout: number_var(ENV_METADATA_TIMEOUT_SECS)?
                .map_or(defaults.metadata_timeout, Duration::from_secs),
            courtesy_delay: number_var(ENV_COURTESY_DELAY_MS)?
                .map_or(defaults.courtesy_delay, Duration::from_millis),
            sample_metadata: bool_var(ENV_SAMPLE_METADATA)?.unwrap_or(defaults.sample_metadata),
        })
    }

    /// Bearer token for the aggregator's official API.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
    pub fn aggregator_url(&self) -> &Url {
        &self.aggregator_url
    }
    pub fn aggregator_api_url(&self) -> &Url {
        &self.aggregator_api_url
    }
    pub fn regional_url(&self) -> &Url {
        &self.regional_url
    }
    pub fn search_timeout(&self) -> Duration {
        self.search_timeout
    }
    pub fn page_timeout(&self) -> Duration {
        self.page_timeout
    }
    pub fn metadata_timeout(&self) -> Duration {
        self.metadata_timeout
    }
    /// Pause before each lyrics-page fetch.
    pub fn courtesy_delay(&self) -> Duration {
        self.courtesy_delay
    }
    /// Return a canned metadata record when no token is configured.
    pub fn sample_metadata(&self) -> bool {
        self.sample_metadata
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_aggregator_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.aggregator_url = parse_url(ENV_AGGREGATOR_URL, url)?;
        Ok(self)
    }

    pub fn with_aggregator_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.aggregator_api_url = parse_url(ENV_AGGREGATOR_API_URL, url)?;
        Ok(self)
    }

    pub fn with_regional_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.regional_url = parse_url(ENV_REGIONAL_URL, url)?;
        Ok(self)
    }

    pub fn with_timeouts(mut self, search: Duration, page: Duration, metadata: Duration) -> Self {
        self.search_timeout = search;
        self.page_timeout = page;
        self.metadata_timeout = metadata;
        self
    }

    pub fn with_courtesy_delay(mut self, delay: Duration) -> Self {
        self.courtesy_delay = delay;
        self
    }

    pub fn with_sample_metadata(mut self, enabled: bool) -> Self {
        self.sample_metadata = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let url = |raw: &str| {
            Url::parse(raw).unwrap_or_else(|e| unreachable!("default url {raw:?}: {e}"))
        };
        Self {
            access_token: None,
            aggregator_url: url(DEFAULT_AGGREGATOR_URL),
            aggregator_api_url: url(DEFAULT_AGGREGATOR_API_URL),
            regional_url: url(DEFAULT_REGIONAL_URL),
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            metadata_timeout: Duration::from_secs(DEFAULT_METADATA_TIMEOUT_SECS),
            courtesy_delay: Duration::from_millis(DEFAULT_COURTESY_DELAY_MS),
            sample_metadata: false,
        }
    }
}

/// Base URLs always end in `/` so relative joins append instead of
/// replacing the last path segment.
fn parse_url(field: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        field,
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn url_var(field: &'static str) -> Result<Option<Url>, ConfigError> {
    match env::var(field) {
        Ok(raw) if !raw.trim().is_empty() => parse_url(field, &raw).map(Some),
        _ => Ok(None),
    }
}

fn number_var(field: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(field) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim()
                .parse()
                .map(Some)
                .map_err(|e: std::num::ParseIntError| ConfigError::InvalidValue {
                    field,
                    reason: e.to_string(),
                })
        }
        _ => Ok(None),
    }
}

fn bool_var(field: &'static str) -> Result<Option<bool>, ConfigError> {
    match env::var(field) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            other => Err(ConfigError::InvalidValue {
                field,
                reason: format!("expected a boolean, got {other:?}"),
            }),
        },
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 9] = [
        ENV_GENIUS_ACCESS_TOKEN,
        ENV_AGGREGATOR_URL,
        ENV_AGGREGATOR_API_URL,
        ENV_REGIONAL_URL,
        ENV_SEARCH_TIMEOUT_SECS,
        ENV_PAGE_TIMEOUT_SECS,
        ENV_METADATA_TIMEOUT_SECS,
        ENV_COURTESY_DELAY_MS,
        ENV_SAMPLE_METADATA,
    ];

    fn clear_env() {
        for key in ALL_VARS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.access_token(), None);
        assert_eq!(cfg.aggregator_url().as_str(), DEFAULT_AGGREGATOR_URL);
        assert_eq!(cfg.aggregator_api_url().as_str(), DEFAULT_AGGREGATOR_API_URL);
        assert_eq!(cfg.regional_url().as_str(), DEFAULT_REGIONAL_URL);
        assert_eq!(cfg.search_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.page_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.metadata_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.courtesy_delay(), Duration::from_millis(1000));
        assert!(!cfg.sample_metadata());
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_GENIUS_ACCESS_TOKEN, " token-123 ");
            env::set_var(ENV_AGGREGATOR_URL, "http://127.0.0.1:9000");
            env::set_var(ENV_REGIONAL_URL, "http://127.0.0.1:9001/blog");
            env::set_var(ENV_PAGE_TIMEOUT_SECS, "30");
            env::set_var(ENV_COURTESY_DELAY_MS, "0");
            env::set_var(ENV_SAMPLE_METADATA, "true");
        }
        let cfg = Config::from_env().unwrap();
        clear_env();

        assert_eq!(cfg.access_token(), Some("token-123"));
        assert_eq!(cfg.aggregator_url().as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.regional_url().as_str(), "http://127.0.0.1:9001/blog/");
        assert_eq!(cfg.page_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.search_timeout(), Duration::from_secs(10));
        assert!(cfg.courtesy_delay().is_zero());
        assert!(cfg.sample_metadata());
    }

    #[test]
    fn blank_token_is_absent() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_GENIUS_ACCESS_TOKEN, "   ");
        }
        let cfg = Config::from_env().unwrap();
        clear_env();
        assert_eq!(cfg.access_token(), None);
    }

    #[test]
    fn invalid_values_are_reported() {
        let _guard = ENV_MUTEX.lock().unwrap();

        for (key, value) in [
            (ENV_SEARCH_TIMEOUT_SECS, "soon"),
            (ENV_AGGREGATOR_API_URL, "not a url"),
            (ENV_REGIONAL_URL, "ftp://example.com"),
            (ENV_SAMPLE_METADATA, "maybe"),
        ] {
            clear_env();
            unsafe {
                env::set_var(key, value);
            }
            let err = Config::from_env().unwrap_err();
            let ConfigError::InvalidValue { field, .. } = err;
            assert_eq!(field, key);
        }
        clear_env();
    }
}
