//! Cache module for storing API responses to disk
//!
//! This module provides a response cache that persists raw API bodies to the
//! filesystem, keyed by the MD5 hash of the request URL. Entries are judged
//! fresh or stale by their modification time against a configurable max age,
//! where a max age of zero means entries never expire.

mod manager;

pub use manager::{CachedResponse, ResponseCache};
