// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Support for FLAC tags.

#![cfg(feature = "flac")]

use crate::tag::{Tag, TagKey};
use std::path::Path;

/// FLAC tag.
pub struct FlacTag {
    /// The underlying tag data.
    data: metaflac::Tag,
}

impl std::fmt::Debug for FlacTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlacTag").finish_non_exhaustive()
    }
}

impl FlacTag {
    /// Read the FLAC tag from the path
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        let data = metaflac::Tag::read_from_path(path)?;
        Ok(FlacTag { data })
    }

    /// Get the vorbis key name for a tag key.
    fn tag_key_to_frame(key: &TagKey) -> &'static str {
        match key {
            TagKey::Album => "ALBUM",
            TagKey::AlbumArtist => "ALBUMARTIST",
            TagKey::Artist => "ARTIST",
            TagKey::TrackNumber => "TRACKNUMBER",
            TagKey::TrackTitle => "TITLE",
        }
    }
}

impl Tag for FlacTag {
    fn get(&self, key: &TagKey) -> Option<&str> {
        self.data
            .get_vorbis(Self::tag_key_to_frame(key))
            .and_then(|mut iterator| iterator.next())
    }
}
