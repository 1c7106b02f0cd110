// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Functions related to importing files.

use crate::lookup::find_releases;
use crate::release::ReleaseInfo;
use crate::scanner::ScannedFile;
use crate::soundcloud::SoundCloudClient;
use crate::util::{walk_dir, FormattedDuration};
use crate::Config;
use std::collections::HashSet;
use std::path::PathBuf;
use xdg::BaseDirectories;

/// Log a human-readable listing of a release candidate.
fn log_candidate(release: &ReleaseInfo) {
    log::info!(
        "Candidate: {} ({} tracks) [{}]",
        release
            .artist
            .as_deref()
            .map_or_else(|| release.title.clone(), |artist| format!("{artist} - {}", release.title)),
        release.tracks.len(),
        release.data_source,
    );
    for track in &release.tracks {
        let mut line = format!("  {}. [{}/{}] {}", track.index, track.medium, track.medium_index, track.title);
        if let Some(length) = track.length {
            line.push_str(&format!(" ({})", length.formatted_duration()));
        }
        if let Some(offset) = track.stream_offset {
            line.push_str(&format!(" @ {}", offset.formatted_duration()));
        }
        if let Some(medium_title) = &track.medium_title {
            line.push_str(&format!(" [{medium_title}]"));
        }
        if let Some(track_alt) = &track.track_alt {
            line.push_str(&format!(" [{track_alt}]"));
        }
        log::info!("{line}");
    }
}

/// Log the scanned files of a directory, with favourite markers.
fn log_scanned_files(files: &[ScannedFile]) {
    for file in files {
        let marker = if file.favourite { "*" } else { " " };
        match file.dates.modified {
            Some(modified) => log::debug!(
                "{marker} {} (modified {})",
                file.path.display(),
                modified.format("%Y-%m-%d")
            ),
            None => log::debug!("{marker} {}", file.path.display()),
        }
    }
}

/// Run an import.
///
/// # Errors
///
/// If the underlying [`walk_dir`] function encounters any form of I/O or other error, an error
/// variant will be returned.
pub async fn run(config: &Config, input_path: PathBuf) -> crate::Result<()> {
    let cache = BaseDirectories::with_prefix(env!("CARGO_PKG_NAME"))?;
    let client = SoundCloudClient::new(config, Some(&cache))?;

    let supported_extensions = HashSet::from(["mp3", "flac"]);
    for item in walk_dir(input_path) {
        let (path, _dirs, files) = item?;
        let scanned_files: Vec<ScannedFile> = files
            .iter()
            .filter(|path| {
                path.extension()
                    .map(std::ffi::OsStr::to_ascii_lowercase)
                    .and_then(|extension| {
                        extension
                            .to_str()
                            .map(|extension| supported_extensions.contains(extension))
                    })
                    .unwrap_or(false)
            })
            .filter_map(|path| match ScannedFile::scan(path.clone(), config) {
                Ok(file) => Some(file),
                Err(err) => {
                    log::warn!("Failed to read {}: {}", path.display(), err);
                    None
                }
            })
            .collect();
        if scanned_files.is_empty() {
            continue;
        }

        log::info!(
            "Tagging: {} ({} tracks)",
            path.display(),
            scanned_files.len()
        );
        log_scanned_files(&scanned_files);

        let releases = find_releases(&client, config, &scanned_files).await;
        if releases.is_empty() {
            log::info!("No candidates found.");
            continue;
        }
        for release in &releases {
            log_candidate(release);
        }
    }

    Ok(())
}
