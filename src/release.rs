// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Release metadata assembled from SoundCloud resources.

use crate::comments::track_names_from_comments;
use crate::soundcloud::{ApiComment, ApiResource};
use crate::tracklist::{resolve_tracklist, RawTrackEntry, ResolvedTrack};
use crate::Config;
use chrono::TimeDelta;
use regex::Regex;
use std::sync::OnceLock;

/// Name of this metadata source.
pub const DATA_SOURCE: &str = "Soundcloud";

/// A release candidate with its resolved tracklist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release title.
    pub title: String,
    /// Release artist.
    pub artist: Option<String>,
    /// ID of the SoundCloud resource this release was built from.
    pub soundcloud_id: Option<u64>,
    /// ID of the uploading user.
    pub soundcloud_user_id: Option<u64>,
    /// Public name of the uploading user.
    pub soundcloud_username: Option<String>,
    /// Name of the metadata source.
    pub data_source: &'static str,
    /// The resolved tracks.
    pub tracks: Vec<ResolvedTrack>,
}

/// Matches a trailing `(clip)` marker on a track title.
fn clip_suffix_regex() -> &'static Regex {
    /// Lazily initialized static regex.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\(clip\)$").expect("hardcoded clip suffix regex must compile")
    })
}

/// Clean up a track title.
///
/// Strips a trailing `(clip)` marker and a leading `"{artist} - "` prefix (both
/// case-insensitive), then trims surrounding whitespace.
#[must_use]
pub fn clean_track_title(title: &str, artist: Option<&str>) -> String {
    let title = clip_suffix_regex().replace(title, "");
    let title = match artist
        .filter(|artist| !artist.is_empty())
        .and_then(|artist| Regex::new(&format!("(?i)^{} - ", regex::escape(artist))).ok())
    {
        Some(prefix_regex) => prefix_regex.replace(&title, "").into_owned(),
        None => title.into_owned(),
    };
    title.trim().to_string()
}

impl ReleaseInfo {
    /// Build release metadata from a playlist or album resource.
    ///
    /// If the resource's tracks carry position codes, the tracklist goes through the full
    /// normalization (coalescing, medium assignment, disc titles). Otherwise the tracks are
    /// enumerated sequentially on a single medium.
    ///
    /// Returns [`None`] for resources of any other kind.
    #[must_use]
    pub fn from_release_resource(
        resource: &ApiResource,
        artist: Option<&str>,
        config: &Config,
    ) -> Option<Self> {
        if !resource.is_release() {
            return None;
        }

        let raw_tracklist: Vec<RawTrackEntry> = resource
            .tracks
            .iter()
            .map(|track| {
                let mut entry = RawTrackEntry::from(track);
                entry.title = clean_track_title(&entry.title, artist);
                entry
            })
            .collect();

        let tracks = if raw_tracklist
            .iter()
            .any(|entry| entry.position.as_deref().is_some_and(|pos| !pos.is_empty()))
        {
            resolve_tracklist(&raw_tracklist, config)
        } else {
            raw_tracklist
                .iter()
                .zip(1u32..)
                .map(|(entry, index)| ResolvedTrack {
                    index,
                    medium: 1,
                    medium_index: index,
                    title: entry.title.clone(),
                    length: entry.duration.as_deref().and_then(crate::util::parse_track_length),
                    ..ResolvedTrack::default()
                })
                .collect()
        };

        Some(ReleaseInfo {
            title: resource.title.clone().unwrap_or_default(),
            artist: artist.map(ToString::to_string),
            soundcloud_id: resource.id,
            soundcloud_user_id: resource.user_id,
            soundcloud_username: resource.username().map(ToString::to_string),
            data_source: DATA_SOURCE,
            tracks,
        })
    }

    /// Build release metadata from a single-stream track resource.
    ///
    /// The tracklist is mined from the uploader's timestamped comments, matched against the
    /// local items (`(track number, title)` pairs). Items without a matching comment are
    /// omitted.
    ///
    /// Returns [`None`] for resources of any other kind.
    #[must_use]
    pub fn from_track_resource(
        resource: &ApiResource,
        comments: &[ApiComment],
        items: &[(u32, String)],
        artist: Option<&str>,
    ) -> Option<Self> {
        if !resource.is_track() {
            return None;
        }

        let tracks = resource
            .user_id
            .map(|user_id| track_names_from_comments(comments, user_id, items))
            .unwrap_or_default()
            .into_iter()
            .map(|(track_number, commented)| ResolvedTrack {
                index: track_number,
                medium: 1,
                medium_index: track_number,
                title: commented.title,
                stream_offset: Some(TimeDelta::milliseconds(commented.timestamp)),
                ..ResolvedTrack::default()
            })
            .collect();

        Some(ReleaseInfo {
            title: resource
                .title
                .as_deref()
                .map(|title| clean_track_title(title, artist))
                .unwrap_or_default(),
            artist: artist.map(ToString::to_string),
            soundcloud_id: resource.id,
            soundcloud_user_id: resource.user_id,
            soundcloud_username: resource.username().map(ToString::to_string),
            data_source: DATA_SOURCE,
            tracks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soundcloud::{ApiTrack, ApiUser};

    #[test]
    fn test_clean_track_title_strips_clip_suffix() {
        assert_eq!(clean_track_title("Sonnentanz (Clip)", None), "Sonnentanz");
        assert_eq!(clean_track_title("Sonnentanz (clip)", None), "Sonnentanz");
        assert_eq!(
            clean_track_title("Sonnentanz (clip) Remix", None),
            "Sonnentanz (clip) Remix"
        );
    }

    #[test]
    fn test_clean_track_title_strips_artist_prefix() {
        assert_eq!(
            clean_track_title("Klangkarussell - Netzwerk", Some("Klangkarussell")),
            "Netzwerk"
        );
        assert_eq!(
            clean_track_title("klangkarussell - Netzwerk", Some("Klangkarussell")),
            "Netzwerk"
        );
        assert_eq!(
            clean_track_title("Netzwerk", Some("Klangkarussell")),
            "Netzwerk"
        );
    }

    #[test]
    fn test_clean_track_title_escapes_artist_name() {
        assert_eq!(clean_track_title("A+B - Song", Some("A+B")), "Song");
        assert_eq!(clean_track_title("AAB - Song", Some("A+B")), "AAB - Song");
    }

    fn playlist_resource() -> ApiResource {
        ApiResource {
            kind: "playlist".to_string(),
            id: Some(42),
            title: Some("Netzwerk".to_string()),
            user_id: Some(7),
            user: ApiUser {
                id: Some(7),
                username: Some("Klangkarussell".to_string()),
            },
            tracks: vec![
                ApiTrack {
                    id: Some(1),
                    title: Some("Klangkarussell - Netzwerk (Falls Like Rain)".to_string()),
                    duration: Some("3:57".to_string()),
                    ..ApiTrack::default()
                },
                ApiTrack {
                    id: Some(2),
                    title: Some("Sonnentanz (clip)".to_string()),
                    ..ApiTrack::default()
                },
            ],
        }
    }

    #[test]
    fn test_release_from_playlist_without_positions() {
        let resource = playlist_resource();
        let config = Config::default();
        let release =
            ReleaseInfo::from_release_resource(&resource, Some("Klangkarussell"), &config)
                .unwrap();
        assert_eq!(release.title, "Netzwerk");
        assert_eq!(release.soundcloud_id, Some(42));
        assert_eq!(release.soundcloud_username.as_deref(), Some("Klangkarussell"));
        assert_eq!(release.data_source, "Soundcloud");
        assert_eq!(release.tracks.len(), 2);
        assert_eq!(release.tracks[0].title, "Netzwerk (Falls Like Rain)");
        assert_eq!(release.tracks[0].index, 1);
        assert_eq!(release.tracks[0].medium_index, 1);
        assert_eq!(
            release.tracks[0].length,
            Some(TimeDelta::seconds(237))
        );
        assert_eq!(release.tracks[1].title, "Sonnentanz");
        assert_eq!(release.tracks[1].index, 2);
    }

    #[test]
    fn test_release_from_playlist_with_positions() {
        let mut resource = playlist_resource();
        resource.tracks[0].position = Some("A1".to_string());
        resource.tracks[1].position = Some("B1".to_string());
        let config = Config::default();
        let release =
            ReleaseInfo::from_release_resource(&resource, Some("Klangkarussell"), &config)
                .unwrap();
        assert_eq!(release.tracks.len(), 2);
        assert_eq!(release.tracks[0].track_alt.as_deref(), Some("A1"));
        assert_eq!(release.tracks[0].medium, 1);
        assert_eq!(release.tracks[1].track_alt.as_deref(), Some("B1"));
        assert_eq!(release.tracks[1].medium, 1);
        assert_eq!(release.tracks[1].medium_index, 2);
    }

    #[test]
    fn test_release_from_track_resource_uses_comments() {
        let resource = ApiResource {
            kind: "track".to_string(),
            id: Some(128432966),
            title: Some("Live at Fusion Festival".to_string()),
            user_id: Some(7),
            ..ApiResource::default()
        };
        let comments = vec![
            ApiComment {
                user_id: Some(7),
                timestamp: Some(0),
                body: "1. Intro".to_string(),
            },
            ApiComment {
                user_id: Some(7),
                timestamp: Some(600_000),
                body: "2. Sonnentanz".to_string(),
            },
        ];
        let items = vec![(1, "Intro".to_string()), (2, "Sonnentanz".to_string())];
        let release = ReleaseInfo::from_track_resource(&resource, &comments, &items, None).unwrap();
        assert_eq!(release.title, "Live at Fusion Festival");
        assert_eq!(release.tracks.len(), 2);
        assert_eq!(release.tracks[0].title, "Intro");
        assert_eq!(release.tracks[0].stream_offset, Some(TimeDelta::zero()));
        assert_eq!(release.tracks[1].index, 2);
        assert_eq!(release.tracks[1].medium_index, 2);
        assert_eq!(
            release.tracks[1].stream_offset,
            Some(TimeDelta::milliseconds(600_000))
        );
    }

    #[test]
    fn test_kind_mismatch_yields_none() {
        let resource = playlist_resource();
        assert!(ReleaseInfo::from_track_resource(&resource, &[], &[], None).is_none());
        let track = ApiResource {
            kind: "track".to_string(),
            ..ApiResource::default()
        };
        assert!(ReleaseInfo::from_release_resource(&track, None, &Config::default()).is_none());
    }
}
