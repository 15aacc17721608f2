// ABOUTME: Main library entry point for the ambitsync conversion toolkit
// ABOUTME: Converts Openambit activity logs to GPX and syncs them to Strava
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

#![deny(unsafe_code)]

//! # ambitsync
//!
//! Converts the `*.log` files produced by Openambit (the open-source sync
//! tool for Suunto Ambit watches) into GPX 1.1 files with ClueTrust
//! `gpxdata` extensions, and optionally uploads the results to Strava.
//!
//! The conversion core is a single-pass transcoder: one forward walk over
//! the ordered sample stream emits track points and accumulates lap
//! records, then a second pass over the lap records interpolates lap
//! boundary coordinates from the surrounding GPS fixes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ambitsync::convert::{convert_file, ConvertOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     convert_file(
//!         "Move_2025_07_12.log".as_ref(),
//!         "Move_2025_07_12.gpx".as_ref(),
//!         &ConvertOptions::default(),
//!     )?;
//!     Ok(())
//! }
//! ```

/// Environment-based configuration for directories and the Strava API
pub mod config;

/// Log-to-GPX conversion pipeline (sample processing, heart rate, laps)
pub mod convert;

/// Error types shared across the crate
pub mod errors;

/// GPX document rendering and atomic file output
pub mod gpx;

/// Structured logging setup
pub mod logging;

/// Typed representation of Openambit logs and conversion outputs
pub mod models;

/// `OAuth2` token plumbing for the Strava API
pub mod oauth2_client;

/// Openambit log file parsing
pub mod parser;

/// Upload target implementations
pub mod providers;

/// Device-directory staging and batch conversion
pub mod sync;
