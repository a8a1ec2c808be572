//! Request URL construction and identifier coercion

use crate::error::ApiError;

/// Maximum number of ids or names the service accepts in one batch request
pub const MAX_BATCH_SIZE: usize = 12;

/// Bandcamp API endpoints, each pinned to the module version it is written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    BandInfo,
    BandSearch,
    BandDiscography,
    AlbumInfo,
    TrackInfo,
    UrlInfo,
}

impl Endpoint {
    /// Path of the endpoint relative to the API base URL
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::BandInfo => "band/3/info",
            Endpoint::BandSearch => "band/3/search",
            Endpoint::BandDiscography => "band/3/discography",
            Endpoint::AlbumInfo => "album/2/info",
            Endpoint::TrackInfo => "track/3/info",
            Endpoint::UrlInfo => "url/1/info",
        }
    }
}

/// A value that can identify a band, album or track
///
/// The service does not care whether an id is sent as an integer, a numeric
/// string or a float-like string. All of them are coerced to `u64` here so
/// lookups compare equal no matter how the id was supplied.
pub trait Identifier {
    /// Coerces the value to a numeric id
    fn to_id(&self) -> Result<u64, ApiError>;
}

impl Identifier for u64 {
    fn to_id(&self) -> Result<u64, ApiError> {
        Ok(*self)
    }
}

impl Identifier for u32 {
    fn to_id(&self) -> Result<u64, ApiError> {
        Ok(u64::from(*self))
    }
}

impl Identifier for i64 {
    fn to_id(&self) -> Result<u64, ApiError> {
        u64::try_from(*self).map_err(|_| ApiError::InvalidIdentifier(self.to_string()))
    }
}

impl Identifier for i32 {
    fn to_id(&self) -> Result<u64, ApiError> {
        i64::from(*self).to_id()
    }
}

impl Identifier for f64 {
    fn to_id(&self) -> Result<u64, ApiError> {
        float_to_id(*self).ok_or_else(|| ApiError::InvalidIdentifier(self.to_string()))
    }
}

impl Identifier for str {
    fn to_id(&self) -> Result<u64, ApiError> {
        parse_id(self).ok_or_else(|| ApiError::InvalidIdentifier(self.to_string()))
    }
}

impl Identifier for String {
    fn to_id(&self) -> Result<u64, ApiError> {
        self.as_str().to_id()
    }
}

impl<T: Identifier + ?Sized> Identifier for &T {
    fn to_id(&self) -> Result<u64, ApiError> {
        (**self).to_id()
    }
}

/// Parses `"123"` or a float-like `"123.0"` into an id
pub fn parse_id(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(id) = s.parse::<u64>() {
        return Some(id);
    }
    s.parse::<f64>().ok().and_then(float_to_id)
}

/// Accepts finite, non-negative floats without a fractional part
pub(crate) fn float_to_id(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

/// Validates a batch of identifiers and coerces them to ids
///
/// The count limit is checked on the input as given, before duplicates are
/// dropped. Duplicates keep their first position.
pub fn batch_ids<I: Identifier>(ids: &[I]) -> Result<Vec<u64>, ApiError> {
    check_batch_size(ids.len())?;

    let mut out: Vec<u64> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.to_id()?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

/// Validates a batch of band names for the search endpoint
pub fn batch_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<String>, ApiError> {
    check_batch_size(names.len())?;

    names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            if name.is_empty() || name.contains(',') {
                Err(ApiError::InvalidIdentifier(name.to_string()))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}

fn check_batch_size(count: usize) -> Result<(), ApiError> {
    if count == 0 {
        return Err(ApiError::EmptyBatch);
    }
    if count > MAX_BATCH_SIZE {
        return Err(ApiError::TooManyIdentifiers {
            count,
            max: MAX_BATCH_SIZE,
        });
    }
    Ok(())
}

/// Joins ids into the comma separated form the batch endpoints expect
pub fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Encodes a single query value
///
/// Commas are kept literal so batch lists stay readable, and spaces become `+`.
fn encode_value(value: &str) -> String {
    value
        .split(',')
        .map(|part| urlencoding::encode(part).replace("%20", "+"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Encodes parameters as a query string, preserving their order
pub fn encode_query(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), encode_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the full request URL, with the API key as the last parameter
pub fn build_url(
    base_url: &str,
    endpoint: Endpoint,
    params: &[(&str, String)],
    api_key: Option<&str>,
) -> String {
    let mut all: Vec<(&str, String)> = params.to_vec();
    if let Some(key) = api_key {
        all.push(("key", key.to_string()));
    }

    let base = format!("{}/{}", base_url.trim_end_matches('/'), endpoint.path());
    if all.is_empty() {
        base
    } else {
        format!("{}?{}", base, encode_query(&all))
    }
}
