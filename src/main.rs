// Copyright (c) 2025 Pedro Silva <pmsilva@posteo.net>
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy
// of the MPL was not distributed with this file, You can obtain one at
// http://mozilla.org/MPL/2.0/.
//
// SPDX-License-Identifier: MPL-2.0

//! Main module

use clap::Parser;
use cumulus::{import, Config};
use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Organize local audio files using SoundCloud metadata",
    long_about = None
)]
struct Args {
    /// Directory of audio files to look up on SoundCloud.
    path: PathBuf,
    /// Show debug output (cache and API request details).
    #[arg(short, long)]
    verbose: bool,
    /// TOML configuration file overriding the built-in defaults.
    #[arg(short, long, required = false)]
    config_path: Option<PathBuf>,
}

impl Args {
    fn log_level_filter(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    fn config(&self) -> cumulus::Result<Config> {
        match &self.config_path {
            Some(path) => Config::load_from_path(path).map(|config| config.with_defaults()),
            None => Ok(Config::default()),
        }
    }
}

#[tokio::main]
async fn main() -> cumulus::Result<()> {
    let args = Args::parse();
    Builder::new()
        .filter(None, args.log_level_filter())
        .write_style(WriteStyle::Auto)
        .init();
    import::run(&args.config()?, args.path).await
}
