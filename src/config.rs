// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Configuration utils.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Encountered when the configuration cannot be loaded.
#[derive(Error, Debug)]
#[error("Configuration Error: {0}")]
pub struct ConfigError(#[from] toml::de::Error);

/// Default configuration TOML string.
const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Represents a piece of configuration that can be merged with another one.
trait MergeableConfig {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self;
}

/// Configuration for SoundCloud lookups.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    /// Client ID passed to the SoundCloud API.
    pub client_id: Option<String>,
    /// Base URL of the SoundCloud API.
    pub api_base_url: Option<String>,
    /// Number of concurrent connections to use.
    pub connection_limit: Option<usize>,
    /// Do not consider more than this number of search results.
    ///
    /// Use `0` to disable this limit.
    pub search_result_limit: Option<u8>,
    /// Maximum number of comments fetched per track.
    pub comment_limit: Option<u8>,
    /// Maximum number of API requests per minute.
    pub rate_limit_per_minute: Option<u32>,
}

/// Client ID used when the configuration does not provide one.
const DEFAULT_CLIENT_ID: &str = "T11SSWT7phP76J1tU4T6x0NMmXxVnYWx";

/// API base URL used when the configuration does not provide one.
const DEFAULT_API_BASE_URL: &str = "https://api.soundcloud.com";

impl LookupConfig {
    /// Client ID passed to the SoundCloud API.
    pub fn client_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID)
    }

    /// Base URL of the SoundCloud API, without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    /// Number of concurrent connections to use.
    pub fn connection_limit(&self) -> usize {
        self.connection_limit.unwrap_or(1)
    }

    /// Maximum number of search results to consider.
    pub fn search_result_limit(&self) -> u8 {
        self.search_result_limit.unwrap_or(20)
    }

    /// Maximum number of comments fetched per track.
    pub fn comment_limit(&self) -> u8 {
        self.comment_limit.unwrap_or(50)
    }

    /// Maximum number of API requests per minute.
    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute.unwrap_or(25)
    }
}

impl MergeableConfig for LookupConfig {
    fn merge(&self, other: &Self) -> Self {
        LookupConfig {
            client_id: self.client_id.clone().or_else(|| other.client_id.clone()),
            api_base_url: self
                .api_base_url
                .clone()
                .or_else(|| other.api_base_url.clone()),
            connection_limit: self.connection_limit.or(other.connection_limit),
            search_result_limit: self
                .search_result_limit
                .or(other.search_result_limit)
                .filter(|&x| x != 0),
            comment_limit: self.comment_limit.or(other.comment_limit),
            rate_limit_per_minute: self.rate_limit_per_minute.or(other.rate_limit_per_minute),
        }
    }
}

/// Configuration for the import pipeline.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// File names (or paths, of which only the file name is considered) that mark an imported
    /// file as a favourite.
    pub favourites: Option<Vec<String>>,
    /// Prefix track titles with the titles of the divider entries they fall under.
    pub index_tracks: Option<bool>,
}

impl ImportConfig {
    /// Favourite file names, as configured.
    pub fn favourites(&self) -> &[String] {
        self.favourites.as_deref().unwrap_or_default()
    }

    /// Whether track titles are prefixed with division titles.
    pub fn index_tracks(&self) -> bool {
        self.index_tracks.unwrap_or(false)
    }
}

impl MergeableConfig for ImportConfig {
    fn merge(&self, other: &Self) -> Self {
        ImportConfig {
            favourites: self.favourites.clone().or_else(|| other.favourites.clone()),
            index_tracks: self.index_tracks.or(other.index_tracks),
        }
    }
}

/// The main configuration struct.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Configuration for release/track lookup.
    #[serde(default)]
    pub lookup: LookupConfig,
    /// Configuration for the import pipeline.
    #[serde(default)]
    pub import: ImportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::load_default().expect("Failed to load default config")
    }
}

impl MergeableConfig for Config {
    /// Merge this configuration object with another one, taking values not set in this object from
    /// the other one (if present).
    fn merge(&self, other: &Self) -> Self {
        Config {
            lookup: self.lookup.merge(&other.lookup),
            import: self.import.merge(&other.import),
        }
    }
}

impl Config {
    /// Load the configuration from a string slice.
    fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        Ok(config)
    }

    /// Load the default configuration.
    fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_str(DEFAULT_CONFIG)
    }

    /// Load the configuration from a file located at the given path.
    ///
    /// # Errors
    ///
    /// This method can fail if the file cannot be accessed or if it contains malformed
    /// configuration markup.
    pub fn load_from_path<T: AsRef<Path>>(path: T) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::load_from_str(&text)?;
        Ok(config)
    }

    /// Merge this configuration struct with the default values.
    #[must_use]
    pub fn with_defaults(&self) -> Self {
        let default = Self::default();
        self.merge(&default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::default();
        assert_eq!(config.lookup.connection_limit(), 1);
        assert_eq!(config.lookup.rate_limit_per_minute(), 25);
        assert_eq!(config.lookup.comment_limit(), 50);
        assert!(!config.import.index_tracks());
    }

    #[test]
    fn test_merge_prefers_explicit_values() {
        let config = Config::load_from_str(
            r#"
            [lookup]
            search_result_limit = 5

            [import]
            favourites = ["live_take.mp3"]
            "#,
        )
        .unwrap()
        .with_defaults();
        assert_eq!(config.lookup.search_result_limit(), 5);
        assert_eq!(config.import.favourites(), ["live_take.mp3"]);
        assert_eq!(config.lookup.rate_limit_per_minute(), 25);
    }
}
