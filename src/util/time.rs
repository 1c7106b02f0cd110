// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Time-related utility functions.

use chrono::TimeDelta;

/// Indicates that a value can represent a duration as a formatted string.
pub trait FormattedDuration {
    /// Format the duration as a string, either in the form `M:SS` or `H:MM:SS`.
    fn formatted_duration(&self) -> String;
}

impl FormattedDuration for TimeDelta {
    fn formatted_duration(&self) -> String {
        let hours = self.num_hours();
        let minutes = self.num_minutes() - hours * 60;
        let seconds = self.num_seconds() - hours * 60 * 60 - minutes * 60;
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

/// Parse a track length given in the form `MM:SS`.
///
/// Both fields are limited to the range `0..=59`, anything else yields `None`.
pub fn parse_track_length(value: &str) -> Option<TimeDelta> {
    let (minutes, seconds) = value.split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if minutes > 59 || seconds > 59 {
        return None;
    }
    Some(TimeDelta::seconds(i64::from(minutes * 60 + seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_track_length() {
        assert_eq!(parse_track_length("4:05"), Some(TimeDelta::seconds(245)));
        assert_eq!(parse_track_length("04:05"), Some(TimeDelta::seconds(245)));
        assert_eq!(parse_track_length("0:59"), Some(TimeDelta::seconds(59)));
    }

    #[test]
    fn test_parse_track_length_invalid() {
        assert_eq!(parse_track_length(""), None);
        assert_eq!(parse_track_length("405"), None);
        assert_eq!(parse_track_length("4:60"), None);
        assert_eq!(parse_track_length("74:12"), None);
        assert_eq!(parse_track_length("a:05"), None);
        assert_eq!(parse_track_length("-1:05"), None);
    }

    #[test]
    fn test_formatted_duration() {
        assert_eq!(TimeDelta::seconds(245).formatted_duration(), "4:05");
        assert_eq!(TimeDelta::seconds(3725).formatted_duration(), "1:02:05");
    }
}
