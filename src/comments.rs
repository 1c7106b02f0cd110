// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Extraction of track names from timestamped comments.
//!
//! Uploaders of long mixes and live sets often post the track names as comments anchored at the
//! position in the stream where each track starts. Those comments are the only tracklist a
//! single-stream upload has, so we mine them: keep the uploader's own timestamped comments, sort
//! them by position, and match them against the titles of the local files.

use crate::soundcloud::ApiComment;
use std::collections::BTreeMap;

/// A track name recovered from a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentedTrack {
    /// Title of the track (the matched item title, not the raw comment body).
    pub title: String,
    /// Position in the stream where the track starts, in milliseconds.
    pub timestamp: i64,
}

/// Filter the given comments down to the uploader's own timestamped ones.
fn uploader_comments(comments: &[ApiComment], user_id: u64) -> Vec<&ApiComment> {
    comments
        .iter()
        .filter(|comment| comment.user_id == Some(user_id) && comment.timestamp.is_some())
        .collect()
}

/// Match the uploader's timestamped comments against local item titles.
///
/// Each item is a `(track number, title)` pair. For every item, the first comment (in timestamp
/// order) whose body contains the item title names that track. Items without a matching comment
/// are omitted.
#[must_use]
pub fn track_names_from_comments(
    comments: &[ApiComment],
    user_id: u64,
    items: &[(u32, String)],
) -> BTreeMap<u32, CommentedTrack> {
    let mut user_comments = uploader_comments(comments, user_id);
    user_comments.sort_by_key(|comment| comment.timestamp);

    let mut track_names = BTreeMap::new();
    for (track, title) in items {
        if title.is_empty() {
            continue;
        }
        if let Some(comment) = user_comments
            .iter()
            .find(|comment| comment.body.contains(title.as_str()))
        {
            track_names.insert(
                *track,
                CommentedTrack {
                    title: title.clone(),
                    timestamp: comment.timestamp.unwrap_or_default(),
                },
            );
        }
    }
    track_names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(user_id: u64, timestamp: Option<i64>, body: &str) -> ApiComment {
        ApiComment {
            user_id: Some(user_id),
            timestamp,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_only_uploader_comments_with_timestamps_count() {
        let comments = vec![
            comment(1, Some(0), "1. Intro"),
            comment(2, Some(60_000), "Intro is great!"),
            comment(1, None, "Full tracklist coming soon"),
        ];
        let filtered = uploader_comments(&comments, 1);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].body, "1. Intro");
    }

    #[test]
    fn test_track_names_matched_by_title() {
        let comments = vec![
            comment(7, Some(600_000), "2. Moonlight Sonata"),
            comment(7, Some(0), "1. Intro"),
            comment(3, Some(0), "what is the Intro called?"),
        ];
        let items = vec![(1, "Intro".to_string()), (2, "Moonlight Sonata".to_string())];
        let names = track_names_from_comments(&comments, 7, &items);
        assert_eq!(names.len(), 2);
        assert_eq!(names[&1].title, "Intro");
        assert_eq!(names[&1].timestamp, 0);
        assert_eq!(names[&2].title, "Moonlight Sonata");
        assert_eq!(names[&2].timestamp, 600_000);
    }

    #[test]
    fn test_unmatched_items_are_omitted() {
        let comments = vec![comment(7, Some(0), "1. Intro")];
        let items = vec![(1, "Intro".to_string()), (2, "Outro".to_string())];
        let names = track_names_from_comments(&comments, 7, &items);
        assert_eq!(names.len(), 1);
        assert!(!names.contains_key(&2));
    }

    #[test]
    fn test_first_comment_in_timestamp_order_wins() {
        let comments = vec![
            comment(7, Some(900_000), "Intro (reprise)"),
            comment(7, Some(0), "Intro"),
        ];
        let items = vec![(1, "Intro".to_string())];
        let names = track_names_from_comments(&comments, 7, &items);
        assert_eq!(names[&1].timestamp, 0);
    }

    #[test]
    fn test_empty_item_titles_never_match() {
        let comments = vec![comment(7, Some(0), "anything contains the empty string")];
        let items = vec![(1, String::new())];
        let names = track_names_from_comments(&comments, 7, &items);
        assert!(names.is_empty());
    }
}
