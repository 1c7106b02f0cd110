// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Utilities for matching and looking up albums and tracks.

use crate::release::ReleaseInfo;
use crate::scanner::ScannedFile;
use crate::soundcloud::SoundCloudClient;
use crate::tag::{TagKey, TaggedFile};
use futures::stream::{self, StreamExt};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Finds the most common item in the iterator.
///
/// The function returns `None` if the iterator is empty. In other cases, it returns the most
/// common item, its count and the total number of values.
fn max_count<I, T>(items: I) -> Option<(T, usize, usize)>
where
    I: Iterator<Item = T>,
    T: Eq + std::hash::Hash,
{
    let mut counts = HashMap::new();
    items.for_each(|item| *counts.entry(item).or_insert(0) += 1);
    let total = counts.values().sum();
    counts
        .into_iter()
        .max_by_key(|&(_, count)| count)
        .map(|(item, count)| (item, count, total))
}

/// Finds the most common value for a certain tag in an iterator of tagged files.
fn find_most_common_value<'a, I>(files: I, key: &TagKey) -> Option<(&'a str, usize, usize)>
where
    I: Iterator<Item = &'a TaggedFile>,
{
    max_count(
        files.filter_map(|tagged_file| tagged_file.tags().iter().find_map(|tag| tag.get(key))),
    )
}

/// Return `Some(value)` if the value is consensual, otherwise `None`
fn to_consensus<T>((value, count, total): (T, usize, usize)) -> Option<T> {
    (count == total).then_some(value)
}

/// Finds the consensual value for a certain tag in an iterator of tagged files.
///
/// Returns `None` if there is no consensual value.
fn find_consensual_value<'a, I>(files: I, key: &TagKey) -> Option<&'a str>
where
    I: Iterator<Item = &'a TaggedFile>,
{
    find_most_common_value(files, key).and_then(to_consensus)
}

/// Find artist from the given files.
fn find_artist(files: &[ScannedFile]) -> Option<&str> {
    let artist = [TagKey::AlbumArtist, TagKey::Artist]
        .iter()
        .find_map(|key| find_most_common_value(files.iter().map(|file| &file.tagged), key));

    artist
        .and_then(to_consensus)
        .map(|v| match v {
            "VA" | "Various" => "Various Artists",
            value => value,
        })
        .or_else(|| artist.and_then(|(_, count, _)| (count == 1).then_some("Various Artists")))
}

/// Scrub a search query of characters and markers that hurt recall.
///
/// Non-word characters like `!` and `-` can cause a query to return no results even if they
/// match the title, and so can medium designations (`CD1`, `disc 2`) and `EP` markers.
#[must_use]
pub fn scrub_query(query: &str) -> String {
    /// Matches runs of non-word characters.
    static NON_WORD_RE: OnceLock<Regex> = OnceLock::new();
    /// Matches medium designations like `CD1` or `disc 2`.
    static MEDIUM_RE: OnceLock<Regex> = OnceLock::new();
    /// Matches `EP` markers.
    static EP_RE: OnceLock<Regex> = OnceLock::new();

    let non_word = NON_WORD_RE
        .get_or_init(|| Regex::new(r"\W+").expect("hardcoded non-word regex must compile"));
    let medium = MEDIUM_RE.get_or_init(|| {
        Regex::new(r"(?i)\b(CD|disc)\s*\d+").expect("hardcoded medium regex must compile")
    });
    let ep =
        EP_RE.get_or_init(|| Regex::new(r"(?i)\bEP\s*").expect("hardcoded EP regex must compile"));

    let query = non_word.replace_all(query, " ");
    let query = medium.replace_all(&query, "");
    let query = ep.replace_all(&query, "");
    query.trim().to_string()
}

/// Derive the search query for the given files.
///
/// Returns `None` if the files carry neither an artist nor an album name. A Various Artists
/// release is searched by album alone, and an `Untitled` album title is dropped.
fn derive_query(files: &[ScannedFile]) -> Option<String> {
    let artist = find_artist(files);
    let album = find_consensual_value(files.iter().map(|file| &file.tagged), &TagKey::Album)
        .filter(|&album| album != "Untitled");

    let query = match (artist, album) {
        (Some("Various Artists") | None, Some(album)) => album.to_string(),
        (Some(artist), Some(album)) => format!("{artist} {album}"),
        (Some(artist), None) => artist.to_string(),
        (None, None) => return None,
    };
    Some(scrub_query(&query))
}

/// Local items as `(track number, title)` pairs, for matching against comments.
fn local_items(files: &[ScannedFile]) -> Vec<(u32, String)> {
    files
        .iter()
        .zip(1u32..)
        .map(|(file, fallback)| {
            let track = file
                .tagged
                .first_value_of(&TagKey::TrackNumber)
                .and_then(|value| {
                    value
                        .split(['/', '-'])
                        .next()
                        .and_then(|number| number.trim().parse().ok())
                })
                .unwrap_or(fallback);
            let title = file
                .tagged
                .first_value_of(&TagKey::TrackTitle)
                .unwrap_or_default()
                .to_string();
            (track, title)
        })
        .collect()
}

/// Find release candidates for the given files.
///
/// Connection-level errors degrade to an empty candidate list. Candidates are returned in API
/// order.
pub async fn find_releases(
    client: &SoundCloudClient<'_>,
    config: &crate::Config,
    files: &[ScannedFile],
) -> Vec<ReleaseInfo> {
    let Some(query) = derive_query(files) else {
        log::debug!("Files carry no artist or album tags, skipping lookup");
        return Vec::new();
    };
    let artist = find_artist(files);
    if let Some(artist) = artist {
        log::info!("Looking up: {artist} - {query}");
    } else {
        log::info!("Looking up: {query}");
    }

    let resources = match client.search(&query).await {
        Ok(resources) => resources,
        Err(err) => {
            log::debug!("Connection error in release lookup: {err}");
            return Vec::new();
        }
    };

    let items = local_items(files);
    let items = &items;
    stream::iter(resources.iter())
        .map(|resource| async move {
            if resource.is_release() {
                return ReleaseInfo::from_release_resource(resource, artist, config);
            }
            if resource.is_track() {
                let track_id = resource.id?;
                let comments = match client.track_comments(track_id).await {
                    Ok(comments) => comments,
                    Err(err) => {
                        log::debug!("Connection error in comment lookup: {err}");
                        Vec::new()
                    }
                };
                return ReleaseInfo::from_track_resource(resource, &comments, items, artist)
                    .filter(|release| !release.tracks.is_empty());
            }
            None
        })
        .buffered(config.lookup.connection_limit().max(1))
        .filter_map(futures::future::ready)
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_count_empty_iterator() {
        assert_eq!(None, max_count(std::iter::empty::<String>()));
    }

    #[test]
    fn test_max_count_with_strings() {
        let values = ["dog", "horse", "dog", "cat", "cat", "dog"];
        assert_eq!(Some((&"dog", 3, 6)), max_count(values.iter()));
    }

    #[test]
    fn test_max_count_with_integers() {
        let values = [1, 2, 3, 4, 5, 1, 2, 3, 2, 5, 9, 8, 2];
        assert_eq!(Some((&2, 4, 13)), max_count(values.iter()));
    }

    #[test]
    fn test_scrub_query_collapses_non_word_characters() {
        assert_eq!(
            scrub_query("Klangkarussell - Netzwerk!"),
            "Klangkarussell Netzwerk"
        );
    }

    #[test]
    fn test_scrub_query_strips_medium_designations() {
        assert_eq!(scrub_query("Netzwerk CD1"), "Netzwerk");
        assert_eq!(scrub_query("Netzwerk disc 2"), "Netzwerk");
        assert_eq!(scrub_query("Netzwerk Discography"), "Netzwerk Discography");
    }

    #[test]
    fn test_scrub_query_strips_ep_markers() {
        assert_eq!(scrub_query("Sonnentanz EP"), "Sonnentanz");
        assert_eq!(scrub_query("Sleep EP 2"), "Sleep 2");
        assert_eq!(scrub_query("Sleeper"), "Sleeper");
    }

    #[test]
    fn test_scrub_query_keeps_unicode_words() {
        assert_eq!(scrub_query("Später!"), "Später");
    }
}
