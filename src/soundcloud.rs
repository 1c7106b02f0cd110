// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! SoundCloud API model and client.

use crate::cache::Cache;
use crate::tracklist::{ArtistCredit, RawTrackEntry};
use crate::Config;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// User agent sent with every API request.
const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " +",
    env!("CARGO_PKG_REPOSITORY")
);

/// A page of API resources, as returned by the collection endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Page<T> {
    /// The resources on this page.
    #[serde(default = "Vec::new")]
    pub collection: Vec<T>,
}

/// A user on SoundCloud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiUser {
    /// User ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Public user name.
    #[serde(default)]
    pub username: Option<String>,
}

/// A track inside a playlist or album resource.
///
/// Next to the plain stream metadata, some sources attach a foreign tracklist grammar to these
/// records: a position code, nested subtracks, artist credits and a printed duration. Those
/// fields feed the [`crate::tracklist`] normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiTrack {
    /// Track ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Track title.
    #[serde(default)]
    pub title: Option<String>,
    /// Position code (`A1`, `1.2`, ...), if the source provides one.
    #[serde(default)]
    pub position: Option<String>,
    /// Nested subtrack entries.
    #[serde(default)]
    pub sub_tracks: Option<Vec<RawTrackEntry>>,
    /// Artists credited on this track.
    #[serde(default)]
    pub artists: Option<Vec<ArtistCredit>>,
    /// Printed duration in the form `MM:SS`.
    #[serde(default)]
    pub duration: Option<String>,
}

impl From<&ApiTrack> for RawTrackEntry {
    fn from(track: &ApiTrack) -> Self {
        RawTrackEntry {
            position: track.position.clone(),
            title: track.title.clone().unwrap_or_default(),
            sub_tracks: track.sub_tracks.clone(),
            artists: track.artists.clone(),
            duration: track.duration.clone(),
        }
    }
}

/// A resource returned by the search endpoint.
///
/// The API is loosely typed: the `kind` field decides which of the remaining fields are
/// meaningful. Playlists and albums carry a `tracks` list, single tracks do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiResource {
    /// Resource kind (`"playlist"`, `"album"` or `"track"`).
    #[serde(default)]
    pub kind: String,
    /// Resource ID.
    #[serde(default)]
    pub id: Option<u64>,
    /// Resource title.
    #[serde(default)]
    pub title: Option<String>,
    /// ID of the uploading user.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// The uploading user.
    #[serde(default)]
    pub user: ApiUser,
    /// Tracks of a playlist or album resource.
    #[serde(default)]
    pub tracks: Vec<ApiTrack>,
}

impl ApiResource {
    /// `true` if this resource represents a release with its own tracklist.
    #[must_use]
    pub fn is_release(&self) -> bool {
        self.kind == "playlist" || self.kind == "album"
    }

    /// `true` if this resource is a single audio stream.
    #[must_use]
    pub fn is_track(&self) -> bool {
        self.kind == "track"
    }

    /// Public name of the uploading user.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.username.as_deref()
    }
}

/// A comment on a track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiComment {
    /// ID of the commenting user.
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Position in the track that the comment refers to, in milliseconds.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// Comment text.
    #[serde(default)]
    pub body: String,
}

/// Configurable SoundCloud API client with caching support.
#[derive(Debug)]
pub struct SoundCloudClient<'a> {
    /// Configuration
    config: &'a Config,
    /// Cache
    cache: Option<&'a dyn Cache>,
    /// The underlying HTTP client.
    http: reqwest::Client,
    /// Time of the last request that went out, for client-side rate limiting.
    last_request: Mutex<Option<Instant>>,
}

impl<'a> SoundCloudClient<'a> {
    /// Create a new SoundCloud client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &'a Config, cache: Option<&'a dyn Cache>) -> crate::Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            config,
            cache,
            http,
            last_request: Mutex::new(None),
        })
    }

    /// Space out requests so that no more than `rate_limit_per_minute` go out per minute.
    async fn throttle(&self) {
        let interval =
            Duration::from_secs(60) / self.config.lookup.rate_limit_per_minute().max(1);
        let mut last_request = self.last_request.lock().await;
        if let Some(instant) = *last_request {
            let elapsed = instant.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }

    /// Search for releases and tracks matching the given query.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be deserialized.
    pub async fn search(&self, query: &str) -> crate::Result<Vec<ApiResource>> {
        let limit = self.config.lookup.search_result_limit();
        if let Some(page) = self.cache.and_then(|cache| {
            cache
                .get_search_result(query, limit)
                .inspect_err(|err| {
                    log::debug!("Failed to get search result for query {query:?} from cache: {err}");
                })
                .ok()
        }) {
            return Ok(page.collection);
        }

        self.throttle().await;
        let url = format!("{}/search", self.config.lookup.api_base_url());
        let page: Page<ApiResource> = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("client_id", self.config.lookup.client_id()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        log::debug!(
            "Found {} resources using query: {query:?}",
            page.collection.len()
        );

        if let Some(cache) = self.cache {
            match cache.insert_search_result(query, limit, &page) {
                Ok(()) => {
                    log::debug!("Inserted search result for query {query:?} into cache");
                }
                Err(err) => {
                    log::warn!("Failed to insert search result for query {query:?} into cache: {err}");
                }
            }
        }

        Ok(page.collection)
    }

    /// Fetch the comments on the track with the given ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be deserialized.
    pub async fn track_comments(&self, track_id: u64) -> crate::Result<Vec<ApiComment>> {
        if let Some(page) = self.cache.and_then(|cache| {
            cache
                .get_comments(track_id)
                .inspect_err(|err| {
                    log::debug!("Failed to get comments for track {track_id} from cache: {err}");
                })
                .ok()
        }) {
            return Ok(page.collection);
        }

        self.throttle().await;
        let url = format!(
            "{}/tracks/{track_id}/comments",
            self.config.lookup.api_base_url()
        );
        let page: Page<ApiComment> = self
            .http
            .get(&url)
            .query(&[
                ("client_id", self.config.lookup.client_id()),
                ("threaded", "1"),
                ("filter_replies", "0"),
                ("limit", &self.config.lookup.comment_limit().to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        log::debug!(
            "Found {} comments on track {track_id}",
            page.collection.len()
        );

        if let Some(cache) = self.cache {
            match cache.insert_comments(track_id, &page) {
                Ok(()) => {
                    log::debug!("Inserted comments for track {track_id} into cache");
                }
                Err(err) => {
                    log::warn!("Failed to insert comments for track {track_id} into cache: {err}");
                }
            }
        }

        Ok(page.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_JSON: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/soundcloud/search.json"
    ));

    const COMMENTS_JSON: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/data/soundcloud/comments.json"
    ));

    #[test]
    fn test_deserialize_search_page() {
        let page: Page<ApiResource> = serde_json::from_str(SEARCH_JSON).unwrap();
        assert_eq!(page.collection.len(), 2);

        let playlist = &page.collection[0];
        assert!(playlist.is_release());
        assert_eq!(playlist.title.as_deref(), Some("Netzwerk"));
        assert_eq!(playlist.username(), Some("Klangkarussell"));
        assert_eq!(playlist.tracks.len(), 3);
        assert_eq!(playlist.tracks[0].title.as_deref(), Some("Netzwerk (Falls Like Rain)"));

        let track = &page.collection[1];
        assert!(track.is_track());
        assert_eq!(track.id, Some(128432966));
        assert!(track.tracks.is_empty());
    }

    #[test]
    fn test_deserialize_comments_page() {
        let page: Page<ApiComment> = serde_json::from_str(COMMENTS_JSON).unwrap();
        assert_eq!(page.collection.len(), 4);
        assert_eq!(page.collection[0].user_id, Some(3207));
        assert_eq!(page.collection[0].timestamp, Some(0));
        assert!(page.collection[2].timestamp.is_none());
    }

    #[test]
    fn test_api_track_to_raw_entry() {
        let track = ApiTrack {
            id: Some(1),
            title: Some("Sonnentanz".to_string()),
            position: Some("A1".to_string()),
            duration: Some("3:57".to_string()),
            ..ApiTrack::default()
        };
        let entry = RawTrackEntry::from(&track);
        assert_eq!(entry.position.as_deref(), Some("A1"));
        assert_eq!(entry.title, "Sonnentanz");
        assert_eq!(entry.duration.as_deref(), Some("3:57"));
    }
}
