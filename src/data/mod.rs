//! Core data models for the Bandcamp API
//!
//! This module contains the entity types returned by the service (bands,
//! albums, tracks and URL resolutions), the partial variants the discography
//! listing returns, and the lookups that produce them. The lookups are
//! implemented as `impl BandcampClient` blocks in the submodules.

pub mod album;
pub mod band;
pub(crate) mod fields;
pub mod track;
pub mod url;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::client::{parse_id, BandcampClient, CachePolicy};
use crate::error::ApiError;

/// Whether an album or track can be downloaded for free
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DownloadState {
    /// The response carried no download state
    #[default]
    Unset,
    /// Free download (`1`)
    Free,
    /// Paid download (`2`)
    Paid,
}

impl DownloadState {
    /// Maps the service's numeric flag; `None` for codes other than 1 and 2
    pub fn from_code(code: Option<u64>) -> Option<Self> {
        match code {
            None => Some(DownloadState::Unset),
            Some(1) => Some(DownloadState::Free),
            Some(2) => Some(DownloadState::Paid),
            Some(_) => None,
        }
    }

    /// The service's numeric flag for this state
    pub fn code(self) -> Option<u8> {
        match self {
            DownloadState::Unset => None,
            DownloadState::Free => Some(1),
            DownloadState::Paid => Some(2),
        }
    }
}

impl Serialize for DownloadState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.code().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DownloadState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = Option::<u64>::deserialize(deserializer)?;
        DownloadState::from_code(code).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown downloadable state {:?}", code))
        })
    }
}

/// A band (artist account) on Bandcamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// The band's numeric id
    #[serde(deserialize_with = "fields::id")]
    pub band_id: u64,
    /// The band's name; not necessarily unique
    pub name: Option<String>,
    /// The band's subdomain, unique across all bands
    pub subdomain: Option<String>,
    /// The band's home page
    pub url: Option<String>,
    /// The band's alternate home page, not on Bandcamp
    pub offsite_url: Option<String>,
    /// Fields not mapped above, passed through as received
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fully fetched album
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(deserialize_with = "fields::id")]
    pub album_id: u64,
    #[serde(deserialize_with = "fields::id")]
    pub band_id: u64,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "fields::opt_timestamp")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub downloadable: DownloadState,
    pub url: Option<String>,
    /// The album's "about" text, if any
    pub about: Option<String>,
    pub credits: Option<String>,
    /// Cover art, 100x100
    pub small_art_url: Option<String>,
    /// Cover art, 350x350
    pub large_art_url: Option<String>,
    /// The album's artist, if different from the band's name
    pub artist: Option<String>,
    /// Tracks in album order
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fully fetched track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(deserialize_with = "fields::id")]
    pub track_id: u64,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub album_id: Option<u64>,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub band_id: Option<u64>,
    pub title: Option<String>,
    /// Position on the album
    pub number: Option<u32>,
    /// Duration in seconds
    pub duration: Option<f64>,
    /// Release date, only present when it differs from the album's
    #[serde(default, deserialize_with = "fields::opt_timestamp")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub downloadable: DownloadState,
    /// Track URL; the service returns it relative to the band's site
    pub url: Option<String>,
    /// 128 kbps mp3 stream
    pub streaming_url: Option<String>,
    pub lyrics: Option<String>,
    pub about: Option<String>,
    pub credits: Option<String>,
    /// Track art, 100x100, only present when it differs from the album art
    pub small_art_url: Option<String>,
    pub large_art_url: Option<String>,
    /// The track's artist, if different from the album's
    pub artist: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An album as listed in a band's discography
///
/// Lacks `about`, `credits` and the track list; see `AlbumEntry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialAlbum {
    #[serde(deserialize_with = "fields::id")]
    pub album_id: u64,
    #[serde(deserialize_with = "fields::id")]
    pub band_id: u64,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "fields::opt_timestamp")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub downloadable: DownloadState,
    pub url: Option<String>,
    pub small_art_url: Option<String>,
    pub large_art_url: Option<String>,
    pub artist: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A standalone track as listed in a band's discography
///
/// Lacks `number`, `duration`, `streaming_url`, `lyrics`, `about`, `credits`
/// and `album_id`; see `TrackEntry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialTrack {
    #[serde(deserialize_with = "fields::id")]
    pub track_id: u64,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub band_id: Option<u64>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "fields::opt_timestamp")]
    pub release_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub downloadable: DownloadState,
    pub url: Option<String>,
    pub small_art_url: Option<String>,
    pub large_art_url: Option<String>,
    pub artist: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fetches the complete counterpart of a partially populated entity
pub trait Upgrade {
    type Complete;

    /// Performs the lookup for the complete entity
    fn upgrade(
        &self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Self::Complete, ApiError>;
}

/// An entity that is either partially populated or complete
///
/// Fields the partial variant lacks are reached through `complete`, which
/// fetches the full entity once and replaces the partial variant in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Entry<P, C> {
    Partial(P),
    Complete(C),
}

/// An album from a discography listing
pub type AlbumEntry = Entry<PartialAlbum, Album>;

/// A standalone track from a discography listing
pub type TrackEntry = Entry<PartialTrack, Track>;

impl<P, C> Entry<P, C>
where
    P: Upgrade<Complete = C>,
{
    /// Whether the full entity has already been fetched
    pub fn is_complete(&self) -> bool {
        matches!(self, Entry::Complete(_))
    }

    /// The complete entity, if already fetched
    pub fn as_complete(&self) -> Option<&C> {
        match self {
            Entry::Complete(complete) => Some(complete),
            Entry::Partial(_) => None,
        }
    }

    /// Upgrades a partial entry in place and returns the complete entity
    ///
    /// The upgrade honours `policy`: with `CachePolicy::UseCache` a cached
    /// response may be used, `CachePolicy::Refresh` always fetches live. A
    /// complete entry is returned as is without any request.
    pub fn complete(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<&C, ApiError> {
        if let Entry::Partial(partial) = self {
            let complete = partial.upgrade(client, policy)?;
            *self = Entry::Complete(complete);
        }

        self.as_complete()
            .ok_or_else(|| ApiError::UnexpectedResponse("entry was not upgraded".to_string()))
    }

    /// Consumes the entry and returns the complete entity
    pub fn into_complete(
        self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<C, ApiError> {
        match self {
            Entry::Complete(complete) => Ok(complete),
            Entry::Partial(partial) => partial.upgrade(client, policy),
        }
    }
}

/// A band's top level releases: albums and tracks not on an album
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Discography {
    pub albums: Vec<AlbumEntry>,
    pub tracks: Vec<TrackEntry>,
}

/// What a Bandcamp URL resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlResolution {
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub band_id: Option<u64>,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub album_id: Option<u64>,
    #[serde(default, deserialize_with = "fields::opt_id")]
    pub track_id: Option<u64>,
}

/// The most specific entity a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlTarget {
    Band(u64),
    Album(u64),
    Track(u64),
}

impl UrlResolution {
    /// Picks the track, then the album, then the band
    pub fn target(&self) -> Option<UrlTarget> {
        self.track_id
            .map(UrlTarget::Track)
            .or(self.album_id.map(UrlTarget::Album))
            .or(self.band_id.map(UrlTarget::Band))
    }
}

/// Splits a batch response into per-id bodies
///
/// Batch endpoints answer with an object keyed by id, except when exactly one
/// id was requested, in which case some return the entity itself. The
/// single-entity shape is recognised by `marker`, a key only that shape has.
/// The ids in the response must be exactly the requested ones; a missing or
/// unrequested id fails the whole batch.
pub(crate) fn batch_bodies(
    value: Value,
    marker: &str,
    ids: &[u64],
) -> Result<Vec<(u64, Value)>, ApiError> {
    let Value::Object(map) = value else {
        return Err(ApiError::UnexpectedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    if map.contains_key(marker) {
        return match ids {
            [id] => Ok(vec![(*id, Value::Object(map))]),
            _ => Err(ApiError::UnexpectedResponse(format!(
                "single entity returned for {} ids",
                ids.len()
            ))),
        };
    }

    let bodies = map
        .into_iter()
        .map(|(key, body)| {
            parse_id(&key)
                .map(|id| (id, body))
                .ok_or_else(|| ApiError::UnexpectedResponse(format!("invalid id key '{}'", key)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let requested: BTreeSet<u64> = ids.iter().copied().collect();
    let received: BTreeSet<u64> = bodies.iter().map(|(id, _)| *id).collect();
    if received.len() != bodies.len() || received != requested {
        let missing: Vec<u64> = requested.difference(&received).copied().collect();
        let extra: Vec<u64> = received.difference(&requested).copied().collect();
        return Err(ApiError::UnexpectedResponse(format!(
            "batch ids do not match the request (missing {:?}, unrequested {:?})",
            missing, extra
        )));
    }

    Ok(bodies)
}

/// Fails unless an entity's own id is the one it was requested or keyed by
pub(crate) fn check_id(kind: &str, expected: u64, actual: u64) -> Result<(), ApiError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ApiError::UnexpectedResponse(format!(
            "requested {} {} but received {}",
            kind, expected, actual
        )))
    }
}
