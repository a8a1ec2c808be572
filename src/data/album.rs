//! Album lookups and the album discography entry
//!
//! The album endpoint takes exactly one id per request.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{check_id, Album, AlbumEntry, DownloadState, Entry, PartialAlbum, Track, Upgrade};
use crate::client::{BandcampClient, CachePolicy, Endpoint, Identifier};
use crate::error::ApiError;

impl BandcampClient {
    /// Fetches an album with its credits, about text and ordered track list
    pub fn album_info<I: Identifier + ?Sized>(
        &self,
        album_id: &I,
        policy: CachePolicy,
    ) -> Result<Album, ApiError> {
        let album_id = album_id.to_id()?;
        let params = [("album_id", album_id.to_string())];
        let response = self.fetch_json(Endpoint::AlbumInfo, &params, policy)?;
        let album = parse_album(response)?;
        check_id("album", album_id, album.album_id)?;
        Ok(album)
    }
}

/// Maps an album body, letting its tracks inherit the album and band ids
fn parse_album(response: Value) -> Result<Album, ApiError> {
    let mut album: Album = serde_json::from_value(response)?;
    for track in &mut album.tracks {
        track.album_id.get_or_insert(album.album_id);
        track.band_id.get_or_insert(album.band_id);
    }
    Ok(album)
}

impl Upgrade for PartialAlbum {
    type Complete = Album;

    fn upgrade(&self, client: &BandcampClient, policy: CachePolicy) -> Result<Album, ApiError> {
        client.album_info(&self.album_id, policy)
    }
}

impl AlbumEntry {
    pub fn album_id(&self) -> u64 {
        match self {
            Entry::Partial(p) => p.album_id,
            Entry::Complete(c) => c.album_id,
        }
    }

    pub fn band_id(&self) -> u64 {
        match self {
            Entry::Partial(p) => p.band_id,
            Entry::Complete(c) => c.band_id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Entry::Partial(p) => p.title.as_deref(),
            Entry::Complete(c) => c.title.as_deref(),
        }
    }

    pub fn release_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Entry::Partial(p) => p.release_date,
            Entry::Complete(c) => c.release_date,
        }
    }

    pub fn downloadable(&self) -> DownloadState {
        match self {
            Entry::Partial(p) => p.downloadable,
            Entry::Complete(c) => c.downloadable,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Entry::Partial(p) => p.url.as_deref(),
            Entry::Complete(c) => c.url.as_deref(),
        }
    }

    pub fn small_art_url(&self) -> Option<&str> {
        match self {
            Entry::Partial(p) => p.small_art_url.as_deref(),
            Entry::Complete(c) => c.small_art_url.as_deref(),
        }
    }

    pub fn large_art_url(&self) -> Option<&str> {
        match self {
            Entry::Partial(p) => p.large_art_url.as_deref(),
            Entry::Complete(c) => c.large_art_url.as_deref(),
        }
    }

    pub fn artist(&self) -> Option<&str> {
        match self {
            Entry::Partial(p) => p.artist.as_deref(),
            Entry::Complete(c) => c.artist.as_deref(),
        }
    }

    /// The album's "about" text; upgrades a partial entry first
    pub fn about(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.about.as_deref())
    }

    /// The album's credits; upgrades a partial entry first
    pub fn credits(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.credits.as_deref())
    }

    /// The album's tracks in order; upgrades a partial entry first
    pub fn tracks(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<&[Track], ApiError> {
        Ok(&self.complete(client, policy)?.tracks)
    }
}
