// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Caching for SoundCloud API queries.

use crate::soundcloud::{ApiComment, ApiResource, Page};
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use xdg::BaseDirectories;

/// Cache for SoundCloud queries (to not use their API too much unnecessarily).
pub trait Cache: std::fmt::Debug {
    /// Get a search result page from the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache miss occurred or the cache file could not be read or the
    /// deserialization failed.
    fn get_search_result(&self, query: &str, limit: u8) -> Result<Page<ApiResource>, CacheError>;

    /// Insert a search result page into the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file could not be written or the serialization failed.
    fn insert_search_result(
        &self,
        query: &str,
        limit: u8,
        result: &Page<ApiResource>,
    ) -> Result<(), CacheError>;

    /// Get the comments of a track from the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if a cache miss occurred or the cache file could not be read or the
    /// deserialization failed.
    fn get_comments(&self, track_id: u64) -> Result<Page<ApiComment>, CacheError>;

    /// Insert the comments of a track into the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache file could not be written or the serialization failed.
    fn insert_comments(&self, track_id: u64, comments: &Page<ApiComment>)
        -> Result<(), CacheError>;
}

/// Cache Error.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Item was not found in cache.
    #[error("Cache Miss")]
    CacheMiss,
    /// I/O Error.
    #[error("Input/Output error ({:?})", .0)]
    Io(#[from] io::Error),
    /// JSON (De-)Serialization Error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Path under which the cached search results are stored.
const SOUNDCLOUD_SEARCH_PATH_PREFIX: &str = "soundcloud/search";

/// Path under which the cached track comments are stored.
const SOUNDCLOUD_COMMENTS_PATH_PREFIX: &str = "soundcloud/comments";

/// Maximum age of a cache entry after which it expires.
const MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7);

/// Create the cache path for a search query.
fn search_query_path(query: &str, limit: u8) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(query.as_bytes());
    hasher.update([b'|', limit]);
    let hash = hasher.finalize();
    Path::new(SOUNDCLOUD_SEARCH_PATH_PREFIX).join(format!("{hash:064x}.json"))
}

/// Create the cache path for the comments of the track with the given ID.
fn comments_path(track_id: u64) -> PathBuf {
    Path::new(SOUNDCLOUD_COMMENTS_PATH_PREFIX).join(format!("{track_id}.json"))
}

/// Convenience function to get a JSON-deserializable item with the given path from the cache.
fn get_from_cache<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, CacheError> {
    let cache_age = path
        .as_ref()
        .metadata()?
        .modified()
        .ok()
        .and_then(|time| time.elapsed().ok())
        .unwrap_or(Duration::MAX);
    // TODO: Make this configurable.
    if cache_age > MAX_AGE {
        std::fs::remove_file(path)?;
        return Err(CacheError::CacheMiss);
    }

    let f = File::open(path)?;
    let reader = BufReader::new(f);
    Ok(serde_json::from_reader(reader)?)
}

/// Convenience function to insert a JSON-serializable item with the given path into cache.
fn insert_into_cache<T: Serialize, P: AsRef<Path>>(path: P, item: &T) -> Result<(), CacheError> {
    let f = File::create(path)?;
    let writer = BufWriter::new(f);
    Ok(serde_json::to_writer(writer, item)?)
}

impl Cache for BaseDirectories {
    fn get_search_result(&self, query: &str, limit: u8) -> Result<Page<ApiResource>, CacheError> {
        let path = self
            .find_cache_file(search_query_path(query, limit))
            .ok_or(CacheError::CacheMiss)?;
        get_from_cache(path)
    }

    fn insert_search_result(
        &self,
        query: &str,
        limit: u8,
        result: &Page<ApiResource>,
    ) -> Result<(), CacheError> {
        let path = self.place_cache_file(search_query_path(query, limit))?;
        insert_into_cache(path, result)
    }

    fn get_comments(&self, track_id: u64) -> Result<Page<ApiComment>, CacheError> {
        let path = self
            .find_cache_file(comments_path(track_id))
            .ok_or(CacheError::CacheMiss)?;
        get_from_cache(path)
    }

    fn insert_comments(
        &self,
        track_id: u64,
        comments: &Page<ApiComment>,
    ) -> Result<(), CacheError> {
        let path = self.place_cache_file(comments_path(track_id))?;
        insert_into_cache(path, comments)
    }
}
