// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for ID3 tags.

#![cfg(feature = "id3")]

use crate::tag::{Tag, TagKey};
use id3::TagLike;
use std::path::Path;

/// ID3 tag (version 2).
#[derive(Debug)]
pub struct ID3v2Tag {
    /// The underlying tag data.
    data: id3::Tag,
}

impl ID3v2Tag {
    /// Read the ID3 tag from the path
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let data = id3::Tag::read_from_path(path)?;
        Ok(ID3v2Tag { data })
    }

    /// Get the ID3 frame ID for a tag key.
    fn tag_key_to_frame(key: &TagKey) -> &'static str {
        match key {
            TagKey::Album => "TALB",
            TagKey::AlbumArtist => "TPE2",
            TagKey::Artist => "TPE1",
            TagKey::TrackNumber => "TRCK",
            TagKey::TrackTitle => "TIT2",
        }
    }
}

impl Tag for ID3v2Tag {
    fn get(&self, key: &TagKey) -> Option<&str> {
        self.data
            .get(Self::tag_key_to_frame(key))
            .and_then(|frame| frame.content().text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_from_empty_tag() {
        let tag = ID3v2Tag {
            data: id3::Tag::new(),
        };
        assert_eq!(tag.get(&TagKey::Album), None);
        assert_eq!(tag.get(&TagKey::TrackTitle), None);
    }

    #[test]
    fn test_get_track_title() {
        let mut data = id3::Tag::new();
        data.set_title("Poinciana");
        data.set_album("But Not for Me");
        let tag = ID3v2Tag { data };
        assert_eq!(tag.get(&TagKey::TrackTitle), Some("Poinciana"));
        assert_eq!(tag.get(&TagKey::Album), Some("But Not for Me"));
        assert_eq!(tag.get(&TagKey::Artist), None);
    }
}
