// ABOUTME: Device-directory staging and batch conversion of Openambit logs
// ABOUTME: Logs are staged into <data>/movescount and converted into <data>/gpx
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config;
use crate::convert::{convert_file, ConvertOptions};
use crate::errors::SyncError;

/// Name of the staging directory under the data directory
const STAGING_DIR: &str = "movescount";

/// Name of the GPX output directory under the data directory
const GPX_DIR: &str = "gpx";

/// Create the working tree under the base directory: `assets/`, `data/`,
/// `data/gpx/` and `data/movescount/`.
///
/// # Errors
///
/// Returns [`SyncError::Io`] when a directory cannot be created.
pub fn ensure_data_layout(base_dir: &Path) -> Result<(), SyncError> {
    for dir in [
        base_dir.join("assets"),
        base_dir.join("data"),
        base_dir.join("data").join(GPX_DIR),
        base_dir.join("data").join(STAGING_DIR),
    ] {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Copy `*.log` files from the Openambit sync directory into the staging
/// directory, returning how many were copied.
///
/// # Errors
///
/// Returns [`SyncError::NoDeviceDir`] when no sync directory can be
/// located and [`SyncError::Io`] when copying fails.
pub fn stage_device_logs(data_dir: &Path) -> Result<usize, SyncError> {
    let source = config::device_sync_dir().ok_or(SyncError::NoDeviceDir)?;
    if !source.is_dir() {
        return Err(SyncError::NoDeviceDir);
    }
    let staging = data_dir.join(STAGING_DIR);
    fs::create_dir_all(&staging)?;

    info!(from = %source.display(), to = %staging.display(), "copying device logs");
    let mut copied = 0;
    for entry in fs::read_dir(&source)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            if let Some(name) = path.file_name() {
                fs::copy(&path, staging.join(name))?;
                copied += 1;
            }
        }
    }
    info!(copied, "device logs staged");
    Ok(copied)
}

/// Convert every staged log that has no GPX counterpart yet, returning
/// the freshly written GPX paths.
///
/// # Errors
///
/// Returns [`SyncError::Io`] when directories cannot be read and
/// [`SyncError::Convert`] when a log fails to convert.
pub fn convert_new_logs(
    data_dir: &Path,
    options: &ConvertOptions,
) -> Result<Vec<PathBuf>, SyncError> {
    let staging = data_dir.join(STAGING_DIR);
    let gpx_dir = data_dir.join(GPX_DIR);
    fs::create_dir_all(&gpx_dir)?;

    let existing: HashSet<String> = fs::read_dir(&gpx_dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .collect();

    let mut converted = Vec::new();
    if !staging.is_dir() {
        return Ok(converted);
    }

    for entry in fs::read_dir(&staging)? {
        let path = entry?.path();
        if !path.is_file() || !path.extension().is_some_and(|ext| ext == "log") {
            continue;
        }
        let Some(stem) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
            continue;
        };
        if existing.contains(&stem) {
            debug!(file = %path.display(), "already converted, skipping");
            continue;
        }

        let target = gpx_dir.join(format!("{stem}.gpx"));
        info!(from = %path.display(), to = %target.display(), "converting");
        convert_file(&path, &target, options).map_err(|source| SyncError::Convert {
            path: path.display().to_string(),
            source,
        })?;
        converted.push(target);
    }

    info!(converted = converted.len(), "conversion pass finished");
    Ok(converted)
}
