//! Resolving Bandcamp page URLs to entity ids

use super::UrlResolution;
use crate::client::{BandcampClient, CachePolicy, Endpoint};
use crate::error::ApiError;

impl BandcampClient {
    /// Resolves a band, album or track URL to the ids it refers to
    ///
    /// Accepts full URLs as well as bare band domains such as
    /// `cults.bandcamp.com`. A URL the service does not know is reported as a
    /// service error.
    pub fn resolve_url(&self, url: &str, policy: CachePolicy) -> Result<UrlResolution, ApiError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ApiError::InvalidIdentifier(url.to_string()));
        }

        let params = [("url", url.to_string())];
        let response = self.fetch_json(Endpoint::UrlInfo, &params, policy)?;
        Ok(serde_json::from_value(response)?)
    }
}
