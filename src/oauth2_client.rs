// ABOUTME: OAuth2 token types and Strava refresh-grant implementation
// ABOUTME: Only the refresh flow lives here; interactive authorization is out of scope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An OAuth2 access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// Bearer token for API calls
    pub access_token: String,
    /// Token type, normally `Bearer`
    pub token_type: String,
    /// Expiry instant, when the provider reports one
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token for obtaining the next pair
    pub refresh_token: Option<String>,
}

impl OAuth2Token {
    /// Whether the access token has passed its expiry instant.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

/// Token endpoint response as Strava shapes it.
#[derive(Debug, Deserialize)]
struct StravaTokenResponse {
    token_type: String,
    expires_at: i64,
    refresh_token: String,
    access_token: String,
}

/// Refresh a Strava access token through the `refresh_token` grant.
///
/// # Errors
///
/// Returns an error when the HTTP request fails or the endpoint responds
/// with something other than a token pair (e.g. a revoked refresh token).
pub async fn refresh_strava_token(
    client: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OAuth2Token> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response: StravaTokenResponse = client
        .post(token_url)
        .form(&params)
        .send()
        .await
        .context("token refresh request failed")?
        .error_for_status()
        .context("token endpoint rejected the refresh grant")?
        .json()
        .await
        .context("token endpoint returned an unexpected payload")?;

    Ok(OAuth2Token {
        access_token: response.access_token,
        token_type: response.token_type,
        expires_at: Some(
            DateTime::from_timestamp(response.expires_at, 0).unwrap_or_else(Utc::now),
        ),
        refresh_token: Some(response.refresh_token),
    })
}
