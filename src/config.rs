// ABOUTME: Environment-based runtime configuration for directories and the Strava API
// ABOUTME: Client credentials are always externally supplied, never compiled in
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Default Strava API base URL
const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";

/// Default Strava token endpoint
const STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Directory Openambit syncs watch logs into, unless overridden with
/// `OPENAMBIT_DIR`.
#[must_use]
pub fn device_sync_dir() -> Option<PathBuf> {
    env::var_os("OPENAMBIT_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".openambit")))
}

/// Strava upload settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct StravaSettings {
    /// API base URL
    pub api_base: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Path of the user-managed JSON file holding the token pair
    pub key_file: PathBuf,
}

impl StravaSettings {
    /// Resolve settings from `STRAVA_*` environment variables. The key file
    /// defaults to `key.json` under the assets directory.
    ///
    /// # Errors
    ///
    /// Returns an error when `STRAVA_CLIENT_ID` or `STRAVA_CLIENT_SECRET`
    /// is unset; uploads cannot run without them.
    pub fn from_env(assets_dir: &Path) -> Result<Self> {
        let client_id = env::var("STRAVA_CLIENT_ID")
            .context("STRAVA_CLIENT_ID is not set; register an API application and export it")?;
        let client_secret = env::var("STRAVA_CLIENT_SECRET")
            .context("STRAVA_CLIENT_SECRET is not set; register an API application and export it")?;

        let key_file = env::var_os("STRAVA_KEY_FILE")
            .map_or_else(|| assets_dir.join("key.json"), PathBuf::from);

        Ok(Self {
            api_base: env::var("STRAVA_API_BASE").unwrap_or_else(|_| STRAVA_API_BASE.into()),
            token_url: env::var("STRAVA_TOKEN_URL").unwrap_or_else(|_| STRAVA_TOKEN_URL.into()),
            client_id,
            client_secret,
            key_file,
        })
    }
}
