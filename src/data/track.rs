//! Track lookups and the standalone-track discography entry

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{
    batch_bodies, check_id, DownloadState, Entry, PartialTrack, Track, TrackEntry, Upgrade,
};
use crate::client::{batch_ids, join_ids, BandcampClient, CachePolicy, Endpoint, Identifier};
use crate::error::ApiError;

impl BandcampClient {
    /// Fetches a single track
    pub fn track_info<I: Identifier + ?Sized>(
        &self,
        track_id: &I,
        policy: CachePolicy,
    ) -> Result<Track, ApiError> {
        let track_id = track_id.to_id()?;
        let mut tracks = self.track_infos(&[track_id], policy)?;
        tracks.remove(&track_id).ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("track {} missing from response", track_id))
        })
    }

    /// Fetches up to 12 tracks in one request, keyed by track id
    pub fn track_infos<I: Identifier>(
        &self,
        track_ids: &[I],
        policy: CachePolicy,
    ) -> Result<BTreeMap<u64, Track>, ApiError> {
        let ids = batch_ids(track_ids)?;
        let params = [("track_id", join_ids(&ids))];
        let response = self.fetch_json(Endpoint::TrackInfo, &params, policy)?;

        batch_bodies(response, "track_id", &ids)?
            .into_iter()
            .map(|(id, body)| -> Result<(u64, Track), ApiError> {
                let track: Track = serde_json::from_value(body)?;
                check_id("track", id, track.track_id)?;
                Ok((id, track))
            })
            .collect()
    }
}

impl Upgrade for PartialTrack {
    type Complete = Track;

    fn upgrade(&self, client: &BandcampClient, policy: CachePolicy) -> Result<Track, ApiError> {
        let mut track = client.track_info(&self.track_id, policy)?;
        if track.band_id.is_none() {
            track.band_id = self.band_id;
        }
        Ok(track)
    }
}

impl TrackEntry {
    pub fn track_id(&self) -> u64 {
        match self {
            Entry::Partial(p) => p.track_id,
            Entry::Complete(c) => c.track_id,
        }
    }

    pub fn band_id(&self) -> Option<u64> {
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

    // The fields below are only on the full track; reading one upgrades a
    // partial entry first.

    pub fn album_id(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<u64>, ApiError> {
        Ok(self.complete(client, policy)?.album_id)
    }

    pub fn number(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<u32>, ApiError> {
        Ok(self.complete(client, policy)?.number)
    }

    /// Duration in seconds
    pub fn duration(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<f64>, ApiError> {
        Ok(self.complete(client, policy)?.duration)
    }

    pub fn streaming_url(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.streaming_url.as_deref())
    }

    pub fn lyrics(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.lyrics.as_deref())
    }

    pub fn about(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.about.as_deref())
    }

    pub fn credits(
        &mut self,
        client: &BandcampClient,
        policy: CachePolicy,
    ) -> Result<Option<&str>, ApiError> {
        Ok(self.complete(client, policy)?.credits.as_deref())
    }
}
