//! Command-line interface for the `bandcamp` binary
//!
//! Parses arguments with clap, maps them onto a `ClientConfig` and runs the
//! selected lookup. Every command produces a JSON value for `main` to print.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::client::{parse_id, BandcampClient, CachePolicy};
use crate::config::ClientConfig;
use crate::data::Discography;
use crate::error::ApiError;

/// Error types for the command line
#[derive(Debug, Error)]
pub enum CliError {
    /// An id argument is not a numeric id
    #[error("Invalid id: '{0}'. Ids are numbers such as 3463798201")]
    InvalidIdentifier(String),

    /// The lookup itself failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The result could not be rendered as JSON
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Query the Bandcamp developer API from the command line
#[derive(Parser, Debug)]
#[command(name = "bandcamp")]
#[command(about = "Look up bands, albums and tracks on Bandcamp")]
#[command(version)]
pub struct Cli {
    /// Developer API key
    #[arg(long, env = "BANDCAMP_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Directory for cached responses
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Seconds after which a cached response is refetched; 0 never expires
    #[arg(long, value_name = "SECONDS", global = true)]
    pub cache_max_age: Option<u64>,

    /// Do not read or write the response cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Ignore cached responses and fetch from the service
    #[arg(long, global = true)]
    pub refresh: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Band information for up to 12 band ids
    Band {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Bands whose name matches exactly, ignoring case
    Search {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Top level albums and tracks for up to 12 band ids
    Discography {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
        /// Fetch every album and track in full
        #[arg(long)]
        complete: bool,
    },
    /// An album with its track list
    Album {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Track information for up to 12 track ids
    Track {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<String>,
    },
    /// Resolve a Bandcamp URL to band, album and track ids
    Url { url: String },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    /// Delete expired cache files
    Clean {
        /// Delete every cache file, expired or not
        #[arg(long)]
        purge: bool,
    },
}

/// Parses an id argument, accepting `123` and `123.0`
pub fn parse_id_arg(s: &str) -> Result<u64, CliError> {
    parse_id(s).ok_or_else(|| CliError::InvalidIdentifier(s.to_string()))
}

fn parse_id_args(args: &[String]) -> Result<Vec<u64>, CliError> {
    args.iter().map(|arg| parse_id_arg(arg)).collect()
}

impl Cli {
    /// Builds the client configuration
    ///
    /// Starts from the `BANDCAMP_*` environment and lets arguments override it.
    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        let mut config = ClientConfig::from_env()?;

        if let Some(ref key) = self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(ref dir) = self.cache_dir {
            config = config.with_cache_dir(dir.clone());
        }
        if let Some(seconds) = self.cache_max_age {
            config = config.with_cache_max_age(Duration::from_secs(seconds));
        }
        if self.no_cache {
            config = config.without_cache();
        }

        Ok(config)
    }

    /// Builds the client for the selected command
    ///
    /// `cache clean` skips the cleanup a new client normally runs, so the
    /// command itself reports every file it removes.
    pub fn build_client(&self) -> Result<BandcampClient, ApiError> {
        let config = self.client_config()?;
        debug!("Using {:?}", config);

        match self.command {
            Command::Cache { .. } => BandcampClient::without_cleanup(config),
            _ => BandcampClient::new(config),
        }
    }

    pub fn cache_policy(&self) -> CachePolicy {
        if self.refresh {
            CachePolicy::Refresh
        } else {
            CachePolicy::UseCache
        }
    }
}

/// Runs the selected command and returns its output as JSON
///
/// Id arguments are validated before any request is made.
pub fn execute(cli: &Cli, client: &BandcampClient) -> Result<Value, CliError> {
    let policy = cli.cache_policy();

    match cli.command {
        Command::Band { ref ids } => {
            let ids = parse_id_args(ids)?;
            let bands = client.band_infos(&ids, policy)?;
            render_batch(&ids, bands)
        }
        Command::Search { ref names } => {
            let bands = client.search_bands(names, policy)?;
            Ok(serde_json::to_value(bands)?)
        }
        Command::Discography { ref ids, complete } => {
            let ids = parse_id_args(ids)?;
            let mut discographies = client.discographies(&ids, policy)?;
            if complete {
                for discography in discographies.values_mut() {
                    complete_discography(discography, client, policy)?;
                }
            }
            render_batch(&ids, discographies)
        }
        Command::Album { ref id } => {
            let id = parse_id_arg(id)?;
            Ok(serde_json::to_value(client.album_info(&id, policy)?)?)
        }
        Command::Track { ref ids } => {
            let ids = parse_id_args(ids)?;
            let tracks = client.track_infos(&ids, policy)?;
            render_batch(&ids, tracks)
        }
        Command::Url { ref url } => {
            let resolution = client.resolve_url(url, policy)?;
            Ok(serde_json::to_value(resolution)?)
        }
        Command::Cache {
            command: CacheCommand::Clean { purge },
        } => {
            let removed = client.cleanup_cache(purge)?;
            Ok(json!({ "removed": removed }))
        }
    }
}

fn complete_discography(
    discography: &mut Discography,
    client: &BandcampClient,
    policy: CachePolicy,
) -> Result<(), ApiError> {
    for album in &mut discography.albums {
        album.complete(client, policy)?;
    }
    for track in &mut discography.tracks {
        track.complete(client, policy)?;
    }
    Ok(())
}

/// A single requested id renders as the entity itself, several as a map
fn render_batch<T: Serialize>(
    ids: &[u64],
    mut results: BTreeMap<u64, T>,
) -> Result<Value, CliError> {
    if let [id] = ids {
        if let Some(entity) = results.remove(id) {
            return Ok(serde_json::to_value(entity)?);
        }
    }
    Ok(serde_json::to_value(results)?)
}
