//! Bandcamp API request layer
//!
//! `BandcampClient` builds request URLs, consults the on-disk response cache,
//! performs live GET requests through a `Transport` and decodes the JSON body.
//! The per-endpoint lookups live in the `data` module as further `impl` blocks
//! on the client.

mod query;
mod transport;

pub use query::{
    batch_ids, batch_names, build_url, encode_query, join_ids, parse_id, Endpoint, Identifier,
    MAX_BATCH_SIZE,
};
pub(crate) use query::float_to_id;
pub use transport::{HttpResponse, HttpTransport, Transport};

use log::{debug, info, warn};
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Whether a lookup may be answered from the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Use a fresh cached response when one exists
    #[default]
    UseCache,
    /// Ignore the cache and fetch the most up to date response
    Refresh,
}

/// Client for the Bandcamp developer API
pub struct BandcampClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    cache: Option<ResponseCache>,
}

impl std::fmt::Debug for BandcampClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BandcampClient")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl BandcampClient {
    /// Create a client that talks to the live service
    ///
    /// Obsolete cache files are pruned once on creation.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Self::without_cleanup(config)?;

        if let Some(ref cache) = client.cache {
            match cache.cleanup(false) {
                Ok(0) => {}
                Ok(removed) => info!(
                    "Removed {} obsolete cache file(s) from {}",
                    removed,
                    cache.dir().display()
                ),
                Err(e) => warn!("Cache cleanup in {} failed: {}", cache.dir().display(), e),
            }
        }

        Ok(client)
    }

    /// Create a client that talks to the live service, leaving the cache as is
    pub fn without_cleanup(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }

    /// Create a client with a custom transport
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let cache = config.cache.enabled.then(|| match config.cache.dir {
            Some(ref dir) => ResponseCache::with_dir(dir, config.cache.max_age),
            None => ResponseCache::new(config.cache.max_age),
        });

        Self {
            config,
            transport: Box::new(transport),
            cache,
        }
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The response cache, if caching is enabled
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Deletes obsolete cache files, or all of them with `purge`
    ///
    /// Returns the number of removed files; zero when caching is disabled.
    pub fn cleanup_cache(&self, purge: bool) -> Result<usize, ApiError> {
        match self.cache {
            Some(ref cache) => Ok(cache.cleanup(purge)?),
            None => Ok(0),
        }
    }

    /// Requests an endpoint and returns the decoded JSON body
    pub fn fetch_json(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
        policy: CachePolicy,
    ) -> Result<Value, ApiError> {
        self.fetch(endpoint, params, policy).map(|(_, value)| value)
    }

    /// Requests an endpoint and returns the raw response body
    pub fn fetch_bytes(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
        policy: CachePolicy,
    ) -> Result<Vec<u8>, ApiError> {
        self.fetch(endpoint, params, policy).map(|(body, _)| body)
    }

    fn fetch(
        &self,
        endpoint: Endpoint,
        params: &[(&str, String)],
        policy: CachePolicy,
    ) -> Result<(Vec<u8>, Value), ApiError> {
        let url = build_url(
            &self.config.base_url,
            endpoint,
            params,
            self.config.api_key.as_deref(),
        );

        if let Some(body) = self.read_fresh(&url, endpoint, policy) {
            let value = decode_body(&body)?;
            return Ok((body, value));
        }

        let body = self.fetch_live(&url, endpoint)?;
        let value = decode_body(&body)?;

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.write(&url, &body) {
                warn!("Failed to cache {} response: {}", endpoint.path(), e);
            }
        }

        Ok((body, value))
    }

    /// Returns the cached body when the policy allows it and it is still fresh
    fn read_fresh(&self, url: &str, endpoint: Endpoint, policy: CachePolicy) -> Option<Vec<u8>> {
        let cache = self.cache.as_ref()?;
        if policy == CachePolicy::Refresh {
            debug!("Cache bypassed for {}", endpoint.path());
            return None;
        }

        match cache.read(url) {
            Some(cached) if !cached.is_stale => {
                debug!(
                    "Cache hit for {} ({})",
                    endpoint.path(),
                    ResponseCache::key_for(url)
                );
                Some(cached.body)
            }
            Some(_) => {
                debug!("Cache entry for {} is stale", endpoint.path());
                None
            }
            None => {
                debug!("Cache miss for {}", endpoint.path());
                None
            }
        }
    }

    fn fetch_live(&self, url: &str, endpoint: Endpoint) -> Result<Vec<u8>, ApiError> {
        if self.config.api_key.is_none() {
            return Err(ApiError::MissingApiKey);
        }

        debug!("GET {}", endpoint.path());
        let response = self.transport.get(url)?;

        if response.status != 200 {
            return Err(ApiError::Status {
                status: response.status,
                endpoint: endpoint.path().to_string(),
            });
        }

        Ok(response.body)
    }
}

/// Decodes a response body and surfaces service-level errors
fn decode_body(body: &[u8]) -> Result<Value, ApiError> {
    let value: Value = serde_json::from_slice(body)?;

    if let Value::Object(ref obj) = value {
        if obj.contains_key("error") || obj.contains_key("error_message") {
            let message = obj
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ApiError::Service(message));
        }
    }

    Ok(value)
}
