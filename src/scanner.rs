// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Scanning of local audio files.

use crate::tag::TaggedFile;
use crate::util::{file_dates, FileDates};
use crate::Config;
use std::path::{Path, PathBuf};

/// A local audio file with its tags and filesystem annotations.
#[derive(Debug)]
pub struct ScannedFile {
    /// Path of the file.
    pub path: PathBuf,
    /// The tags read from the file.
    pub tagged: TaggedFile,
    /// Filesystem created/modified timestamps of the file.
    pub dates: FileDates,
    /// `true` if the file name matches a configured favourites entry.
    pub favourite: bool,
}

/// `true` if the path's file name equals the file name of any favourites entry.
///
/// Favourites entries may be full paths, of which only the file name is considered.
fn is_favourite(path: &Path, favourites: &[String]) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    favourites
        .iter()
        .filter_map(|favourite| Path::new(favourite).file_name())
        .any(|favourite| favourite == file_name)
}

impl ScannedFile {
    /// Scan the audio file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file's tags or metadata cannot be read.
    pub fn scan(path: PathBuf, config: &Config) -> crate::Result<Self> {
        let tagged = TaggedFile::read_from_path(&path)?;
        let dates = file_dates(&path)?;
        let favourite = is_favourite(&path, config.import.favourites());
        Ok(ScannedFile {
            path,
            tagged,
            dates,
            favourite,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favourite_matches_by_file_name() {
        let favourites = vec!["live_take.mp3".to_string()];
        assert!(is_favourite(
            Path::new("/music/album/live_take.mp3"),
            &favourites
        ));
        assert!(!is_favourite(
            Path::new("/music/album/other_take.mp3"),
            &favourites
        ));
    }

    #[test]
    fn test_favourite_entries_may_be_paths() {
        let favourites = vec!["/somewhere/else/live_take.mp3".to_string()];
        assert!(is_favourite(
            Path::new("/music/album/live_take.mp3"),
            &favourites
        ));
    }

    #[test]
    fn test_no_favourites_configured() {
        assert!(!is_favourite(Path::new("/music/album/take.mp3"), &[]));
    }
}
