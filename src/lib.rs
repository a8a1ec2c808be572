//! Bandcamp API client library
//!
//! Looks up bands, albums and tracks through the Bandcamp developer API and
//! keeps the raw responses in an on-disk cache. The `bandcamp` binary is a
//! thin wrapper around the `cli` module.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;
pub mod error;

#[cfg(test)]
mod testing;

pub use client::{BandcampClient, CachePolicy, Identifier};
pub use config::ClientConfig;
pub use data::{
    Album, AlbumEntry, Band, Discography, DownloadState, Entry, PartialAlbum, PartialTrack, Track,
    TrackEntry, UrlResolution, UrlTarget,
};
pub use error::ApiError;
