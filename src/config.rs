//! Client configuration
//!
//! `ClientConfig` carries the API key, the service base URL and the cache
//! settings. It can be built in code with the `with_*` methods or loaded from
//! `BANDCAMP_*` environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ApiError;

/// Default base URL of the Bandcamp developer API
pub const DEFAULT_BASE_URL: &str = "http://api.bandcamp.com/api";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "BANDCAMP_API_KEY";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "BANDCAMP_CACHE_DIR";

/// Environment variable holding the cache max age in seconds
pub const CACHE_MAX_AGE_ENV: &str = "BANDCAMP_CACHE_MAX_AGE";

/// On-disk response cache settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Whether responses are cached at all
    pub enabled: bool,
    /// Cache directory; `None` selects the platform cache directory
    pub dir: Option<PathBuf>,
    /// Age after which an entry is stale. Zero means entries never expire.
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            max_age: Duration::ZERO,
        }
    }
}

/// Configuration for a `BandcampClient`
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Developer API key appended to every request
    pub api_key: Option<String>,
    /// Base URL the endpoint paths are appended to
    pub base_url: String,
    /// Response cache settings
    pub cache: CacheConfig,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with the given API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::default().with_api_key(api_key)
    }

    /// Loads the configuration from `BANDCAMP_*` environment variables
    ///
    /// Unset variables keep their defaults. A max age that is not a whole
    /// number of seconds is rejected.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            config.api_key = Some(key.trim().to_string());
        }

        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.is_empty()) {
            config.cache.dir = Some(PathBuf::from(dir));
        }

        if let Some(max_age) = lookup(CACHE_MAX_AGE_ENV) {
            let seconds = max_age.trim().parse::<u64>().map_err(|_| {
                ApiError::InvalidConfig(format!(
                    "{CACHE_MAX_AGE_ENV} must be a number of seconds, got '{max_age}'"
                ))
            })?;
            config.cache.max_age = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    /// Sets the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets a custom base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets a custom cache directory
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = Some(dir.into());
        self
    }

    /// Sets the cache max age. Zero means entries never expire.
    pub fn with_cache_max_age(mut self, max_age: Duration) -> Self {
        self.cache.max_age = max_age;
        self
    }

    /// Disables the response cache
    pub fn without_cache(mut self) -> Self {
        self.cache.enabled = false;
        self
    }
}
