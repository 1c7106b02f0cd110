// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tracklist normalization.
//!
//! Remote sources describe a release as an ordered list of loosely structured entries: playable
//! tracks with a position code (`A1`, `2.3`, `CD2`, ...), divider entries without a position that
//! merely label a section, and subtrack entries that subdivide a physical track into movements.
//! Dash-separated codes like `1-1` fit no recognized structure and parse to nothing.
//! This module flattens such a list into a sequence of [`ResolvedTrack`] values with consistent
//! 1-based track, medium and per-medium numbering.

use crate::util::parse_track_length;
use crate::Config;
use chrono::TimeDelta;
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Credit for an artist on a track or divider entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// Name of the credited artist.
    pub name: String,
    /// Identifier of the artist at the remote source.
    #[serde(default)]
    pub id: Option<u64>,
    /// Join phrase between this credit and the next one (e.g. `" feat. "`).
    #[serde(default)]
    pub join: Option<String>,
}

/// A raw tracklist entry as returned by the remote source.
///
/// An entry without a position is a divider entry that labels a section of the tracklist instead
/// of denoting a playable track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawTrackEntry {
    /// Position code of the entry (absent or empty for divider entries).
    #[serde(default)]
    pub position: Option<String>,
    /// Title of the track or section.
    #[serde(default)]
    pub title: String,
    /// Nested subtrack entries, if the source nests them below this entry.
    #[serde(default)]
    pub sub_tracks: Option<Vec<RawTrackEntry>>,
    /// Artists credited on this entry.
    #[serde(default)]
    pub artists: Option<Vec<ArtistCredit>>,
    /// Track duration in the form `MM:SS`.
    #[serde(default)]
    pub duration: Option<String>,
}

impl RawTrackEntry {
    /// `true` if this entry is a divider (no playable position).
    fn is_divider(&self) -> bool {
        self.position.as_deref().is_none_or(str::is_empty)
    }
}

/// A flattened, fully numbered track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTrack {
    /// 1-based index into the flattened tracklist.
    pub index: u32,
    /// 1-based number of the medium this track is on.
    pub medium: u32,
    /// 1-based index of this track on its medium.
    pub medium_index: u32,
    /// Title of the medium, taken from a qualifying divider entry.
    pub medium_title: Option<String>,
    /// The original position code of the entry this track was resolved from.
    pub track_alt: Option<String>,
    /// Track title.
    pub title: String,
    /// Joined artist credits.
    pub artist: Option<String>,
    /// Identifier of the first credited artist at the remote source.
    pub artist_id: Option<u64>,
    /// Track length.
    pub length: Option<TimeDelta>,
    /// Position in the source stream where the track starts, for tracks resolved from a single
    /// continuous stream.
    pub stream_offset: Option<TimeDelta>,
}

/// A parsed position code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackPosition {
    /// Medium label (letters/digits, e.g. `A` in `A1` or `CD` in `CD2`).
    pub medium: Option<String>,
    /// Declared index of the track on its medium.
    pub index: Option<String>,
    /// Subtrack index (`2` in `1.2`, `A` in `12A`).
    pub sub_index: Option<String>,
}

/// Compiled regular expression used by [`TrackPosition::parse`].
static POSITION_RE: OnceLock<Regex> = OnceLock::new();

impl TrackPosition {
    /// Parse a position code into its medium, index and subtrack index parts.
    ///
    /// Position codes come in several forms (`1`, `A1`, `CD2`, `A1.1`, `12A`, ...): an optional
    /// medium label made of letters and digits, an optional trailing numeric index, and an
    /// optional subtrack marker that is either a dot followed by alphanumerics or an uppercase
    /// letter suffix immediately following a digit. Parsing is case-insensitive; the returned
    /// parts are uppercased.
    ///
    /// A code that fits no structure parses to all-`None`. This is logged but never an error, so
    /// that a single malformed position cannot abort a whole tracklist.
    #[must_use]
    pub fn parse(position: &str) -> Self {
        /// Extract a non-empty capture group as an owned string.
        fn group(captures: &regex::Captures<'_>, index: usize) -> Option<String> {
            captures
                .get(index)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        }

        let re = POSITION_RE.get_or_init(|| {
            Regex::new(
                r"^(?:([A-Z0-9]*[A-Z])?(\d*)\.([A-Z0-9]+)|([A-Z0-9]*[A-Z])?(\d+)([A-Z]+)|([A-Z0-9]*[A-Z])?(\d*))$",
            )
            .expect("hardcoded position regex must compile")
        });

        let uppercased = position.to_uppercase();
        let Some(captures) = re.captures(&uppercased) else {
            log::debug!("Invalid position: {position:?}");
            return Self::default();
        };

        let (medium, index, sub_index) = if captures.get(3).is_some() {
            (group(&captures, 1), group(&captures, 2), group(&captures, 3))
        } else if captures.get(6).is_some() {
            (group(&captures, 4), group(&captures, 5), group(&captures, 6))
        } else {
            (group(&captures, 7), group(&captures, 8), None)
        };

        // A subtrack marker with nothing in front of it (e.g. ".5") fits no structure.
        if medium.is_none() && index.is_none() && sub_index.is_some() {
            log::debug!("Invalid position: {position:?}");
            return Self::default();
        }

        Self {
            medium,
            index,
            sub_index,
        }
    }
}

/// Left-pad a subindex with spaces to the given width, so that subindexes of differing lengths
/// compare like the underlying values (`" 2" < "10"`).
fn pad_left(value: &str, width: usize) -> String {
    format!("{value:>width$}")
}

/// Merge a group of consecutive subtrack entries into `tracklist`.
///
/// If the most recent kept entry is a divider, the divider either becomes the merged track itself
/// (subtracks with a subindex are logical divisions of one physical track, so the divider supplies
/// the title and gets a synthesized position) or is discarded while the subtracks are spliced in
/// as independent physical tracks that inherit the divider's artist credits. Without a preceding
/// divider, the group collapses into a single synthetic track whose title joins the subtrack
/// titles.
fn add_merged_subtracks(
    tracklist: &mut Vec<RawTrackEntry>,
    subtracks: &[RawTrackEntry],
) -> crate::Result<()> {
    let first = subtracks
        .first()
        .ok_or(crate::Error::InconsistentTracklist("empty subtrack group"))?;
    let parsed = first
        .position
        .as_deref()
        .map(TrackPosition::parse)
        .unwrap_or_default();
    let position = format!(
        "{}{}",
        parsed.medium.as_deref().unwrap_or_default(),
        parsed.index.as_deref().unwrap_or_default()
    );

    if tracklist.last().is_some_and(RawTrackEntry::is_divider) {
        if parsed.sub_index.is_some() {
            if let Some(divider) = tracklist.last_mut() {
                divider.position = Some(position);
            }
        } else {
            let divider = tracklist
                .pop()
                .ok_or(crate::Error::InconsistentTracklist("no divider to pop"))?;
            for subtrack in subtracks {
                let mut subtrack = subtrack.clone();
                if subtrack.artists.is_none() {
                    subtrack.artists.clone_from(&divider.artists);
                }
                tracklist.push(subtrack);
            }
        }
    } else {
        let mut track = first.clone();
        track.title = subtracks.iter().map(|t| t.title.as_str()).join(" / ");
        tracklist.push(track);
    }

    Ok(())
}

/// Pre-process a tracklist, merging subtracks into single tracks.
///
/// The title for a merged track is the one from the preceding divider entry, if present;
/// otherwise it is a combination of the subtrack titles.
///
/// # Errors
///
/// Returns an error if the subtrack structure is inconsistent (e.g. an empty nested subtrack
/// list). Callers are expected to degrade to the raw tracklist in that case.
pub fn coalesce_tracks(raw_tracklist: &[RawTrackEntry]) -> crate::Result<Vec<RawTrackEntry>> {
    let pad_width = raw_tracklist.len();
    let mut tracklist: Vec<RawTrackEntry> = Vec::with_capacity(raw_tracklist.len());
    let mut subtracks: Vec<RawTrackEntry> = Vec::new();
    let mut prev_subindex = String::new();

    for track in raw_tracklist {
        // Regular subtrack (track with a subindex).
        if let Some(position) = track.position.as_deref().filter(|p| !p.is_empty()) {
            if let Some(subindex) = TrackPosition::parse(position).sub_index {
                let padded = pad_left(&subindex, pad_width);
                if padded > prev_subindex {
                    // Subtrack still part of the current main track.
                    subtracks.push(track.clone());
                } else {
                    // Subtrack part of a new group (..., 1.3, *2.1*, ...).
                    add_merged_subtracks(&mut tracklist, &subtracks)?;
                    subtracks = vec![track.clone()];
                }
                prev_subindex = padded;
                continue;
            }
        }

        // Divider entry with nested subtracks: keep the divider as the title source and merge
        // the nested list right below it.
        if track.is_divider() {
            if let Some(nested) = &track.sub_tracks {
                tracklist.push(track.clone());
                add_merged_subtracks(&mut tracklist, nested)?;
                continue;
            }
        }

        // Regular track or divider without nested subtracks.
        if !subtracks.is_empty() {
            add_merged_subtracks(&mut tracklist, &subtracks)?;
            subtracks.clear();
            prev_subindex.clear();
        }
        tracklist.push(track.clone());
    }

    // Merge and add the remaining subtracks, if any.
    if !subtracks.is_empty() {
        add_merged_subtracks(&mut tracklist, &subtracks)?;
    }

    Ok(tracklist)
}

/// A track that has its flat index assigned but no medium numbering yet.
struct PendingTrack {
    /// 1-based index into the flattened tracklist.
    index: u32,
    /// Track title, already prefixed with division titles if configured.
    title: String,
    /// Joined artist credits.
    artist: Option<String>,
    /// Identifier of the first credited artist.
    artist_id: Option<u64>,
    /// Track length.
    length: Option<TimeDelta>,
    /// The original position code.
    track_alt: Option<String>,
    /// Parsed medium label.
    parsed_medium: Option<String>,
    /// Declared (string) medium index, only used to tell media apart from track-index letters.
    parsed_index: Option<String>,
}

/// Join artist credits into a single artist string, and pick the identifier of the first credit.
fn join_artist_credits(artists: Option<&[ArtistCredit]>) -> (Option<String>, Option<u64>) {
    let Some(artists) = artists.filter(|credits| !credits.is_empty()) else {
        return (None, None);
    };

    let artist_id = artists.first().and_then(|credit| credit.id);
    let mut name = String::new();
    for (i, credit) in artists.iter().enumerate() {
        name.push_str(&credit.name);
        if i + 1 < artists.len() {
            name.push_str(credit.join.as_deref().unwrap_or(", "));
        }
    }
    (Some(name), artist_id)
}

/// Build a [`PendingTrack`] for a kept tracklist entry.
fn pending_track(
    track: &RawTrackEntry,
    position: &str,
    index: u32,
    divisions: &[String],
    config: &Config,
) -> PendingTrack {
    let title = if config.import.index_tracks() && !divisions.is_empty() {
        format!("{}: {}", divisions.join(", "), track.title)
    } else {
        track.title.clone()
    };
    let parsed = TrackPosition::parse(position);
    let (artist, artist_id) = join_artist_credits(track.artists.as_deref());

    PendingTrack {
        index,
        title,
        artist,
        artist_id,
        length: track.duration.as_deref().and_then(parse_track_length),
        track_alt: Some(position.to_string()),
        parsed_medium: parsed.medium,
        parsed_index: parsed.index,
    }
}

/// Detect media with two sides (i.e. vinyl or cassette).
///
/// If every track carries a medium label and the sorted set of lowercased labels is a run of
/// consecutive single letters starting at `a`, each pair of consecutive sides is assumed to
/// belong to one physical medium.
fn detect_two_sided_media(tracks: &[PendingTrack]) -> bool {
    if tracks.is_empty() || tracks.iter().any(|track| track.parsed_medium.is_none()) {
        return false;
    }

    let labels: BTreeSet<String> = tracks
        .iter()
        .filter_map(|track| track.parsed_medium.as_ref())
        .map(|medium| medium.to_lowercase())
        .collect();
    labels.len() <= 26
        && labels
            .iter()
            .zip('a'..='z')
            .all(|(label, expected)| label.chars().exactly_one().ok() == Some(expected))
}

/// Flatten a raw tracklist into fully numbered tracks.
///
/// This runs [`coalesce_tracks`] first and falls back to the raw tracklist if coalescing fails:
/// metadata quality degrades, but an import never aborts over a malformed tracklist. Kept entries
/// are then numbered sequentially, media are inferred from the position codes (with two-sided
/// media folded into one medium number each), and divider entries directly in front of the first
/// track of a medium supply that medium's title.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn resolve_tracklist(raw_tracklist: &[RawTrackEntry], config: &Config) -> Vec<ResolvedTrack> {
    let clean_tracklist = match coalesce_tracks(raw_tracklist) {
        Ok(tracklist) => tracklist,
        Err(err) => {
            log::error!("Failed to coalesce tracklist, using the raw tracklist instead: {err}");
            raw_tracklist.to_vec()
        }
    };

    let mut pending: Vec<PendingTrack> = Vec::new();
    // Divider titles by the index of the track that follows them.
    let mut divider_titles: HashMap<u32, String> = HashMap::new();
    // Distinct works and intra-work divisions, as defined by divider entries.
    let mut divisions: Vec<String> = Vec::new();
    let mut next_divisions: Vec<String> = Vec::new();
    let mut index: u32 = 0;

    for track in &clean_tracklist {
        if let Some(position) = track.position.as_deref().filter(|p| !p.is_empty()) {
            index += 1;
            if !next_divisions.is_empty() {
                // End of a block of divider entries: update the current divisions.
                divisions.append(&mut next_divisions);
            }
            pending.push(pending_track(track, position, index, &divisions, config));
        } else {
            next_divisions.push(track.title.clone());
            // New levels of division are expected at the beginning of the tracklist (and
            // possibly elsewhere).
            divisions.pop();
            divider_titles.insert(index + 1, track.title.clone());
        }
    }

    // Fix up medium and medium index for each track. The declared position codes are unreliable,
    // but the tracks are in order.
    let sides_per_medium: u32 = if detect_two_sided_media(&pending) {
        2
    } else {
        1
    };

    let mut medium: Option<String> = None;
    let mut medium_count: u32 = 0;
    let mut index_count: u32 = 0;
    let mut side_count: u32 = 0;

    let mut tracks: Vec<ResolvedTrack> = Vec::with_capacity(pending.len());
    for track in pending {
        // Special case: a single-letter medium label without a declared index whose ordinal does
        // not line up with the sides seen so far is not a medium at all, but a track-index letter
        // (e.g. Roman-numeral-like sequences I, II, III, ...).
        let medium_is_index = track.parsed_medium.as_ref().is_some_and(|label| {
            track.parsed_index.is_none()
                && (label.chars().count() != 1
                    || label
                        .chars()
                        .next()
                        .map(|c| u32::from(c).wrapping_sub(64))
                        != Some(side_count + 1))
        });

        if !medium_is_index && medium != track.parsed_medium {
            side_count += 1;
            if sides_per_medium == 2 {
                if side_count % sides_per_medium == 1 {
                    // Two-sided medium changed. Reset the per-medium index.
                    index_count = 0;
                    medium_count += 1;
                }
            } else {
                // Medium changed. Reset the per-medium index.
                medium_count += 1;
                index_count = 0;
            }
            medium.clone_from(&track.parsed_medium);
        }

        index_count += 1;
        medium_count = medium_count.max(1);
        tracks.push(ResolvedTrack {
            index: track.index,
            medium: medium_count,
            medium_index: index_count,
            medium_title: None,
            track_alt: track.track_alt,
            title: track.title,
            artist: track.artist,
            artist_id: track.artist_id,
            length: track.length,
            stream_offset: None,
        });
    }

    // A divider entry directly in front of the first track of a medium supplies that medium's
    // title, carried forward until the next qualifying divider.
    let mut medium_title: Option<String> = None;
    for track in &mut tracks {
        if track.medium_index == 1 {
            medium_title = divider_titles.get(&track.index).cloned();
        }
        track.medium_title.clone_from(&medium_title);
    }

    tracks
}
