// ABOUTME: Strava upload client: athlete identity check, token refresh, GPX upload
// ABOUTME: Token pairs live in a user-managed JSON key file and are rewritten after refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::multipart;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::StravaSettings;
use crate::oauth2_client;

/// Token pair persisted in the key file.
///
/// Unknown fields (token type, expiry bookkeeping from earlier tools) are
/// tolerated on read and dropped on rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTokens {
    /// Current bearer token
    pub access_token: String,
    /// Refresh token for the next grant
    pub refresh_token: String,
    /// Unix expiry timestamp, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// Strava athlete identity as returned by `GET /athlete`.
#[derive(Debug, Deserialize)]
pub struct AthleteSummary {
    /// Numeric athlete ID
    pub id: i64,
    /// Public username, when set
    pub username: Option<String>,
}

/// Uploads converted GPX files to Strava.
pub struct StravaUploader {
    client: reqwest::Client,
    settings: StravaSettings,
}

impl StravaUploader {
    /// Create an uploader for the given settings.
    #[must_use]
    pub fn new(settings: StravaSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    /// Upload every file in the list, refreshing the stored token pair
    /// once if Strava rejects the current access token.
    ///
    /// Individual upload failures are logged and do not stop the batch;
    /// the first infrastructure error (unreadable key file, failed
    /// refresh) aborts.
    ///
    /// # Errors
    ///
    /// Returns an error when the key file is missing or unreadable, or
    /// when the token refresh fails.
    pub async fn upload_all(&self, files: &[PathBuf]) -> Result<usize> {
        let mut tokens = self.load_tokens()?;

        if !self.token_accepted(&tokens.access_token).await? {
            info!("Strava rejected the access token, refreshing");
            tokens = self.refresh_tokens(&tokens).await?;
        }

        let mut uploaded = 0;
        for file in files {
            match self.upload_activity(file, &tokens.access_token).await {
                Ok(()) => {
                    info!(file = %file.display(), "uploaded");
                    uploaded += 1;
                }
                Err(err) => error!(file = %file.display(), error = %err, "upload failed"),
            }
        }
        Ok(uploaded)
    }

    /// Check the access token by fetching the athlete identity.
    async fn token_accepted(&self, access_token: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/athlete", self.settings.api_base))
            .bearer_auth(access_token)
            .send()
            .await
            .context("athlete request failed")?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(false),
            status if status.is_success() => {
                let athlete: AthleteSummary = response
                    .json()
                    .await
                    .context("athlete response was not valid JSON")?;
                info!(
                    athlete = athlete.id,
                    username = athlete.username.as_deref().unwrap_or("unknown"),
                    "authenticated with Strava"
                );
                Ok(true)
            }
            status => bail!("athlete request returned HTTP {status}"),
        }
    }

    async fn refresh_tokens(&self, stale: &StoredTokens) -> Result<StoredTokens> {
        let token = oauth2_client::refresh_strava_token(
            &self.client,
            &self.settings.token_url,
            &self.settings.client_id,
            &self.settings.client_secret,
            &stale.refresh_token,
        )
        .await?;

        let refresh_token = token.refresh_token.unwrap_or_else(|| {
            warn!("no refresh token in refresh response, keeping the previous one");
            stale.refresh_token.clone()
        });
        let tokens = StoredTokens {
            access_token: token.access_token,
            refresh_token,
            expires_at: token.expires_at.map(|instant| instant.timestamp()),
        };
        self.store_tokens(&tokens)?;
        Ok(tokens)
    }

    /// POST one GPX file to the uploads endpoint.
    async fn upload_activity(&self, file: &Path, access_token: &str) -> Result<()> {
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("cannot read '{}'", file.display()))?;
        let file_name = file
            .file_name()
            .map_or_else(|| "activity.gpx".to_owned(), |name| name.to_string_lossy().into_owned());

        let form = multipart::Form::new()
            .text("data_type", "gpx")
            .part("file", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/uploads", self.settings.api_base))
            .bearer_auth(access_token)
            .multipart(form)
            .send()
            .await
            .context("upload request failed")?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            bail!("upload returned HTTP {status}: {body}")
        }
    }

    fn load_tokens(&self) -> Result<StoredTokens> {
        let key_file = &self.settings.key_file;
        let contents = fs::read_to_string(key_file).with_context(|| {
            format!(
                "cannot read key file '{}'; create it with your access_token and refresh_token",
                key_file.display()
            )
        })?;
        serde_json::from_str(&contents)
            .with_context(|| format!("key file '{}' is not valid JSON", key_file.display()))
    }

    fn store_tokens(&self, tokens: &StoredTokens) -> Result<()> {
        let key_file = &self.settings.key_file;
        let contents = serde_json::to_string_pretty(tokens)?;
        fs::write(key_file, contents)
            .with_context(|| format!("cannot rewrite key file '{}'", key_file.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_tokens_tolerate_extra_fields() {
        let tokens: StoredTokens = serde_json::from_str(
            r#"{"token_type":"Bearer","access_token":"a","refresh_token":"r","expires_at":1,"expires_in":21600}"#,
        )
        .expect("parses");
        assert_eq!(tokens.access_token, "a");
        assert_eq!(tokens.refresh_token, "r");
        assert_eq!(tokens.expires_at, Some(1));
    }
}
