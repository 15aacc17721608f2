// ABOUTME: ambitsync CLI - stages Openambit logs, converts them to GPX, uploads to Strava
// ABOUTME: Mirrors the copy/convert/upload pipeline with an `all` shortcut
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors
//!
//! Usage:
//! ```bash
//! # Copy fresh watch logs out of ~/.openambit
//! ambitsync --data ~/moves copy
//!
//! # Convert staged logs to GPX
//! ambitsync --data ~/moves convert
//!
//! # Upload specific GPX files to Strava
//! ambitsync --data ~/moves upload --files ~/moves/data/gpx/Move_1.gpx
//!
//! # Full pipeline: copy, convert, upload what was converted
//! ambitsync --data ~/moves all
//! ```

use std::path::PathBuf;

use ambitsync::config::StravaSettings;
use ambitsync::convert::ConvertOptions;
use ambitsync::logging::LoggingConfig;
use ambitsync::providers::strava::StravaUploader;
use ambitsync::sync;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "ambitsync",
    about = "Openambit activity log toolkit",
    long_about = "Copies activity logs from the Openambit sync directory, converts them to GPX \
                  with gpxdata extensions, and uploads the results to Strava."
)]
struct Cli {
    /// Base directory where staged logs, GPX output and assets live
    #[arg(long, short = 'd')]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy fresh activity logs from the Openambit sync directory
    Copy,

    /// Convert staged logs that have no GPX counterpart yet
    Convert {
        #[command(flatten)]
        conversion: ConversionArgs,
    },

    /// Upload GPX files to Strava
    Upload {
        /// Files to upload
        #[arg(long, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Copy, convert and upload in one run
    All {
        #[command(flatten)]
        conversion: ConversionArgs,
    },
}

#[derive(Debug, clap::Args)]
struct ConversionArgs {
    /// Fail on unknown activity types instead of omitting <type>
    #[arg(long)]
    strict: bool,

    /// Emit one heart-rate value per beat instead of averaging each IBI batch
    #[arg(long)]
    no_average_hr: bool,
}

impl ConversionArgs {
    fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            average_hr: !self.no_average_hr,
            strict: self.strict,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    LoggingConfig::from_env().init()?;

    sync::ensure_data_layout(&cli.data)?;
    let data_dir = cli.data.join("data");
    let assets_dir = cli.data.join("assets");

    match cli.command {
        Command::Copy => {
            sync::stage_device_logs(&data_dir)?;
        }
        Command::Convert { conversion } => {
            sync::convert_new_logs(&data_dir, &conversion.to_options())?;
        }
        Command::Upload { files } => {
            for file in &files {
                if !file.is_file() {
                    bail!("file '{}' does not exist", file.display());
                }
            }
            if files.is_empty() {
                bail!("nothing to upload; pass --files or run `all`");
            }
            upload(&assets_dir, files).await?;
        }
        Command::All { conversion } => {
            sync::stage_device_logs(&data_dir)?;
            let converted = sync::convert_new_logs(&data_dir, &conversion.to_options())?;
            if converted.is_empty() {
                info!("no new activities to upload");
            } else {
                upload(&assets_dir, converted).await?;
            }
        }
    }

    Ok(())
}

async fn upload(assets_dir: &std::path::Path, files: Vec<PathBuf>) -> Result<()> {
    let settings = StravaSettings::from_env(assets_dir)?;
    let uploader = StravaUploader::new(settings);
    let uploaded = uploader.upload_all(&files).await?;
    info!(uploaded, total = files.len(), "upload pass finished");
    Ok(())
}
