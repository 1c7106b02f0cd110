// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Tags and tag-related functions.

#[cfg(feature = "flac")]
mod flac;
#[cfg(feature = "id3")]
mod id3;

use std::path::Path;

/// A tag key describes the kind of information in a generic, format-independent way.
///
/// Only the keys that are needed to derive a search query are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    /// Title of the release.
    Album,
    /// Artist(s) primarily credited on the release.
    AlbumArtist,
    /// Track Artist Name(s).
    Artist,
    /// Track number on the disc.
    TrackNumber,
    /// Track Title.
    TrackTitle,
}

/// A tag that can be used for reading.
pub trait Tag {
    /// Get the string value for the tag key.
    fn get(&self, key: &TagKey) -> Option<&str>;
}

/// A tagged file that contains zero or more tags.
pub struct TaggedFile {
    /// Tags that are present in the file.
    content: Vec<Box<dyn Tag>>,
}

impl std::fmt::Debug for TaggedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaggedFile")
            .field("tags", &self.content.len())
            .finish()
    }
}

impl TaggedFile {
    /// Creates a [`TaggedFile`] from the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file extension is unsupported or the tag data cannot be read.
    pub fn read_from_path(path: impl AsRef<Path>) -> crate::Result<Self> {
        path.as_ref()
            .extension()
            .map(std::ffi::OsStr::to_ascii_lowercase)
            .ok_or(crate::Error::UnknownFileType)
            .and_then(|extension| {
                extension
                    .to_str()
                    .ok_or(crate::Error::UnknownFileType)
                    .map(|ext| match ext {
                        #[cfg(feature = "id3")]
                        "mp3" => id3::ID3v2Tag::read_from_path(&path)
                            .map(Box::new)
                            .map(|tag| Box::<dyn Tag>::from(tag))
                            .map(|tag| vec![tag]),
                        #[cfg(feature = "flac")]
                        "flac" => flac::FlacTag::read_from_path(&path)
                            .map(Box::new)
                            .map(|tag| Box::<dyn Tag>::from(tag))
                            .map(|tag| vec![tag]),
                        ext => {
                            log::debug!("Unknown file extension {:?}", ext);
                            Err(crate::Error::UnknownFileType)
                        }
                    })?
            })
            .map(|content| Self { content })
    }

    /// Returns zero or more [`Tag`] objects.
    #[must_use]
    pub fn tags(&self) -> &[Box<dyn Tag>] {
        &self.content
    }

    /// Get the first value present for the given tag key, across all contained tags.
    #[must_use]
    pub fn first_value_of(&self, key: &TagKey) -> Option<&str> {
        self.content.iter().find_map(|tag| tag.get(key))
    }
}
