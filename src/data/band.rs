//! Band lookups: info, search and discography
//!
//! Band info and discography accept up to 12 ids per request. Search accepts
//! up to 12 names; names must match exactly, ignoring case.

use std::collections::BTreeMap;

use log::debug;
use serde_json::Value;

use super::{batch_bodies, check_id, AlbumEntry, Band, Discography, Entry, TrackEntry};
use crate::client::{
    batch_ids, batch_names, join_ids, BandcampClient, CachePolicy, Endpoint, Identifier,
};
use crate::error::ApiError;

impl BandcampClient {
    /// Fetches information about a single band
    pub fn band_info<I: Identifier + ?Sized>(
        &self,
        band_id: &I,
        policy: CachePolicy,
    ) -> Result<Band, ApiError> {
        let band_id = band_id.to_id()?;
        let mut bands = self.band_infos(&[band_id], policy)?;
        bands.remove(&band_id).ok_or_else(|| {
            ApiError::UnexpectedResponse(format!("band {} missing from response", band_id))
        })
    }

    /// Fetches information about up to 12 bands in one request
    ///
    /// The result is keyed by band id.
    pub fn band_infos<I: Identifier>(
        &self,
        band_ids: &[I],
        policy: CachePolicy,
    ) -> Result<BTreeMap<u64, Band>, ApiError> {
        let ids = batch_ids(band_ids)?;
        let params = [("band_id", join_ids(&ids))];
        let response = self.fetch_json(Endpoint::BandInfo, &params, policy)?;

        batch_bodies(response, "band_id", &ids)?
            .into_iter()
            .map(|(id, body)| -> Result<(u64, Band), ApiError> {
                let band: Band = serde_json::from_value(body)?;
                check_id("band", id, band.band_id)?;
                Ok((id, band))
            })
            .collect()
    }

    /// Searches for bands by exact name
    ///
    /// Returns every match for every name, in the order the service lists
    /// them; an empty list when nothing matched.
    pub fn search_bands<S: AsRef<str>>(
        &self,
        names: &[S],
        policy: CachePolicy,
    ) -> Result<Vec<Band>, ApiError> {
        let names = batch_names(names)?;
        let params = [("name", names.join(","))];
        let response = self.fetch_json(Endpoint::BandSearch, &params, policy)?;
        parse_search_results(response)
    }

    /// Fetches the top level discography of a single band
    pub fn discography<I: Identifier + ?Sized>(
        &self,
        band_id: &I,
        policy: CachePolicy,
    ) -> Result<Discography, ApiError> {
        let band_id = band_id.to_id()?;
        let mut discographies = self.discographies(&[band_id], policy)?;
        discographies.remove(&band_id).ok_or_else(|| {
            ApiError::UnexpectedResponse(format!(
                "discography of band {} missing from response",
                band_id
            ))
        })
    }

    /// Fetches the discographies of up to 12 bands in one request
    pub fn discographies<I: Identifier>(
        &self,
        band_ids: &[I],
        policy: CachePolicy,
    ) -> Result<BTreeMap<u64, Discography>, ApiError> {
        let ids = batch_ids(band_ids)?;
        let params = [("band_id", join_ids(&ids))];
        let response = self.fetch_json(Endpoint::BandDiscography, &params, policy)?;

        batch_bodies(response, "discography", &ids)?
            .into_iter()
            .map(|(id, body)| parse_discography(body).map(|d| (id, d)))
            .collect()
    }
}

/// Parses the `results` array of a search response
fn parse_search_results(mut response: Value) -> Result<Vec<Band>, ApiError> {
    match response.get_mut("results").map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(results @ Value::Array(_)) => Ok(serde_json::from_value(results)?),
        Some(_) => Err(ApiError::UnexpectedResponse(
            "search results are not a list".to_string(),
        )),
    }
}

/// Parses one band's `{"discography": [...]}` body
///
/// Items carrying an `album_id` are albums, items carrying a `track_id` are
/// standalone tracks. An item carrying both is listed in both; anything else
/// is skipped.
fn parse_discography(body: Value) -> Result<Discography, ApiError> {
    let items = match body {
        Value::Object(mut map) => map.remove("discography"),
        _ => None,
    };
    let Some(Value::Array(items)) = items else {
        return Err(ApiError::UnexpectedResponse(
            "discography list missing".to_string(),
        ));
    };

    let mut discography = Discography::default();
    for item in items {
        let is_album = item.get("album_id").is_some();
        let is_track = item.get("track_id").is_some();

        if is_album {
            let album: AlbumEntry = Entry::Partial(serde_json::from_value(item.clone())?);
            discography.albums.push(album);
        }
        if is_track {
            let track: TrackEntry = Entry::Partial(serde_json::from_value(item)?);
            discography.tracks.push(track);
        } else if !is_album {
            debug!("Skipping discography item without album_id or track_id");
        }
    }

    Ok(discography)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DownloadState;
    use crate::testing::{test_client, MockTransport};
    use chrono::{TimeZone, Utc};

    const SINGLE_BAND: &str = r#"{
        "band_id": 3463798201,
        "name": "Amanda Palmer",
        "subdomain": "amandapalmer",
        "url": "http://amandapalmer.bandcamp.com",
        "offsite_url": "http://www.amandapalmer.net"
    }"#;

    const MULTIPLE_BANDS: &str = r#"{
        "3789714150": {
            "band_id": 3789714150,
            "name": "Mountain Man",
            "subdomain": "mountainman",
            "url": "http://mountainman.bandcamp.com"
        },
        "4214473200": {
            "band_id": 4214473200,
            "name": "Cults",
            "subdomain": "cults",
            "url": "http://cults.bandcamp.com"
        }
    }"#;

    const SEARCH_LAPFOX: &str = r#"{
        "results": [
            {"band_id": 842757654, "name": "LapFox", "subdomain": "lapfox", "url": "http://lapfox.bandcamp.com"},
            {"band_id": 2142855304, "name": "lapfox", "subdomain": "lapfoxmusic", "url": "http://lapfoxmusic.bandcamp.com"}
        ]
    }"#;

    const SINGLE_DISCOGRAPHY: &str = r#"{
        "discography": [
            {
                "album_id": 4246425639,
                "band_id": 203035041,
                "title": "The Age of Adz",
                "release_date": 1286841600,
                "downloadable": 2,
                "url": "http://music.sufjan.com/album/the-age-of-adz?pk=564",
                "small_art_url": "http://f0.bcbits.com/img/a0897080833_3.jpg",
                "large_art_url": "http://f0.bcbits.com/img/a0897080833_2.jpg",
                "artist": "Sufjan Stevens"
            },
            {
                "album_id": 2199599233,
                "band_id": 203035041,
                "title": "All Delighted People EP",
                "release_date": 1282521600,
                "downloadable": 2,
                "url": "http://music.sufjan.com/album/all-delighted-people-ep?pk=564"
            },
            {
                "track_id": 2323108455,
                "band_id": 203035041,
                "title": "Enchanting Ghost",
                "release_date": 1286841600,
                "url": "/track/enchanting-ghost"
            },
            {
                "title": "Something unknown"
            }
        ]
    }"#;

    const MULTIPLE_DISCOGRAPHIES: &str = r#"{
        "3463798201": {"discography": [
            {"album_id": 2587417518, "band_id": 3463798201, "title": "Who Killed Amanda Palmer"}
        ]},
        "203035041": {"discography": [
            {"album_id": 4246425639, "band_id": 203035041, "title": "The Age of Adz"}
        ]}
    }"#;

    #[test]
    fn test_single_band() {
        let transport = MockTransport::new().respond("band/3/info", SINGLE_BAND);
        let client = test_client(&transport, None);

        let band = client
            .band_info(&3463798201u64, CachePolicy::UseCache)
            .expect("Band lookup should succeed");

        assert_eq!(band.band_id, 3463798201);
        assert_eq!(band.name.as_deref(), Some("Amanda Palmer"));
        assert_eq!(band.subdomain.as_deref(), Some("amandapalmer"));
        assert_eq!(band.url.as_deref(), Some("http://amandapalmer.bandcamp.com"));
        assert_eq!(band.offsite_url.as_deref(), Some("http://www.amandapalmer.net"));
    }

    #[test]
    fn test_single_band_id_forms() {
        let transport = MockTransport::new().respond("band/3/info", SINGLE_BAND);
        let client = test_client(&transport, None);

        for id in ["3463798201", "3463798201.0"] {
            let band = client.band_info(id, CachePolicy::UseCache).unwrap();
            assert_eq!(band.band_id, 3463798201);
        }
        let band = client.band_info(&3463798201.0f64, CachePolicy::UseCache).unwrap();
        assert_eq!(band.band_id, 3463798201);

        // Float-like ids are normalised before they reach the query string
        assert!(transport
            .calls()
            .iter()
            .all(|url| url.contains("band_id=3463798201&")));
    }

    #[test]
    fn test_multiple_bands() {
        let transport = MockTransport::new().respond("band/3/info", MULTIPLE_BANDS);
        let client = test_client(&transport, None);

        let bands = client
            .band_infos(&[3789714150u64, 4214473200], CachePolicy::UseCache)
            .expect("Batch lookup should succeed");

        assert_eq!(bands.len(), 2);
        assert_eq!(bands.keys().copied().collect::<Vec<_>>(), vec![3789714150, 4214473200]);
        assert_eq!(bands[&4214473200].subdomain.as_deref(), Some("cults"));
        assert!(transport.calls()[0].contains("band_id=3789714150,4214473200"));
    }

    #[test]
    fn test_band_batch_of_thirteen_is_rejected_before_request() {
        let transport = MockTransport::new().respond("band/3/info", MULTIPLE_BANDS);
        let client = test_client(&transport, None);
        let ids: Vec<u64> = (1..=13).collect();

        let result = client.band_infos(&ids, CachePolicy::UseCache);

        assert!(matches!(result, Err(ApiError::TooManyIdentifiers { count: 13, .. })));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_search_with_one_result() {
        let transport = MockTransport::new().respond(
            "band/3/search",
            r#"{"results": [{"band_id": 1, "name": "Mumble", "subdomain": "mumble"}]}"#,
        );
        let client = test_client(&transport, None);

        let bands = client.search_bands(&["Mumble"], CachePolicy::UseCache).unwrap();

        assert_eq!(bands.len(), 1);
        assert_eq!(bands[0].name.as_deref(), Some("Mumble"));
    }

    #[test]
    fn test_search_with_multiple_results() {
        let transport = MockTransport::new().respond("band/3/search", SEARCH_LAPFOX);
        let client = test_client(&transport, None);

        let bands = client.search_bands(&["lapfox"], CachePolicy::UseCache).unwrap();

        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].band_id, 842757654);
        assert_eq!(bands[1].band_id, 2142855304);
    }

    #[test]
    fn test_search_with_no_results() {
        let transport = MockTransport::new().respond("band/3/search", r#"{"results": []}"#);
        let client = test_client(&transport, None);

        let bands = client.search_bands(&["unittest"], CachePolicy::UseCache).unwrap();

        assert!(bands.is_empty());
    }

    #[test]
    fn test_search_multiple_names_joined_with_comma() {
        let transport = MockTransport::new().respond("band/3/search", SEARCH_LAPFOX);
        let client = test_client(&transport, None);

        client
            .search_bands(&["lapfox", "mountain man"], CachePolicy::UseCache)
            .unwrap();

        assert!(transport.calls()[0].contains("name=lapfox,mountain+man&key=test-key"));
    }

    #[test]
    fn test_search_twelve_names_is_allowed() {
        let transport = MockTransport::new().respond("band/3/search", r#"{"results": []}"#);
        let client = test_client(&transport, None);
        let names: Vec<String> = (1..=12).map(|i| i.to_string()).collect();

        assert!(client.search_bands(&names, CachePolicy::UseCache).is_ok());
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_search_more_than_twelve_names_is_rejected() {
        let transport = MockTransport::new().respond("band/3/search", r#"{"results": []}"#);
        let client = test_client(&transport, None);
        let names: Vec<String> = (1..=13).map(|i| i.to_string()).collect();

        let result = client.search_bands(&names, CachePolicy::UseCache);

        assert!(matches!(result, Err(ApiError::TooManyIdentifiers { .. })));
        assert_eq!(transport.call_count(), 0, "No request should be dispatched");
    }

    #[test]
    fn test_single_band_discography() {
        let transport = MockTransport::new().respond("band/3/discography", SINGLE_DISCOGRAPHY);
        let client = test_client(&transport, None);

        let discography = client
            .discography(&203035041u64, CachePolicy::UseCache)
            .expect("Discography lookup should succeed");

        assert_eq!(discography.albums.len(), 2);
        assert_eq!(discography.tracks.len(), 1);
        assert!(discography.albums.iter().all(|a| !a.is_complete()));

        let adz = &discography.albums[0];
        assert_eq!(adz.album_id(), 4246425639);
        assert_eq!(adz.band_id(), 203035041);
        assert_eq!(adz.title(), Some("The Age of Adz"));
        assert_eq!(adz.downloadable(), DownloadState::Paid);
        assert_eq!(adz.artist(), Some("Sufjan Stevens"));
        assert_eq!(
            adz.release_date(),
            Some(Utc.with_ymd_and_hms(2010, 10, 12, 0, 0, 0).unwrap())
        );

        let ghost = &discography.tracks[0];
        assert_eq!(ghost.track_id(), 2323108455);
        assert_eq!(ghost.title(), Some("Enchanting Ghost"));
        assert_eq!(ghost.downloadable(), DownloadState::Unset);
    }

    #[test]
    fn test_multiple_band_discographies() {
        let transport = MockTransport::new().respond("band/3/discography", MULTIPLE_DISCOGRAPHIES);
        let client = test_client(&transport, None);

        let discographies = client
            .discographies(&[3463798201u64, 203035041], CachePolicy::UseCache)
            .unwrap();

        assert_eq!(discographies.len(), 2);
        assert_eq!(discographies[&3463798201].albums[0].album_id(), 2587417518);
        assert_eq!(discographies[&203035041].albums[0].album_id(), 4246425639);
    }

    #[test]
    fn test_single_band_rejects_body_for_another_band() {
        let transport =
            MockTransport::new().respond("band/3/info", r#"{"band_id": 2, "name": "Other"}"#);
        let client = test_client(&transport, None);

        let result = client.band_info(&1u64, CachePolicy::UseCache);

        assert!(matches!(result, Err(ApiError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_band_batch_missing_requested_id_is_an_error() {
        let transport = MockTransport::new().respond(
            "band/3/info",
            r#"{"1": {"band_id": 1, "name": "One"}, "99": {"band_id": 99, "name": "Ninety-nine"}}"#,
        );
        let client = test_client(&transport, None);

        let result = client.band_infos(&[1u64, 2], CachePolicy::UseCache);

        assert!(matches!(result, Err(ApiError::UnexpectedResponse(_))));
    }

    #[test]
    fn test_band_batch_body_under_wrong_key_is_an_error() {
        let transport = MockTransport::new().respond(
            "band/3/info",
            r#"{"1": {"band_id": 2}, "2": {"band_id": 2}}"#,
        );
        let client = test_client(&transport, None);

        assert!(client.band_infos(&[1u64, 2], CachePolicy::UseCache).is_err());
    }

    #[test]
    fn test_discography_item_with_album_and_track_id_is_in_both_lists() {
        let body = serde_json::json!({"discography": [
            {"album_id": 10, "track_id": 20, "band_id": 1, "title": "Single"}
        ]});

        let discography = parse_discography(body).unwrap();

        assert_eq!(discography.albums.len(), 1);
        assert_eq!(discography.albums[0].album_id(), 10);
        assert_eq!(discography.tracks.len(), 1);
        assert_eq!(discography.tracks[0].track_id(), 20);
    }

    #[test]
    fn test_discography_without_list_is_an_error() {
        assert!(parse_discography(serde_json::json!({"albums": []})).is_err());
    }
}
