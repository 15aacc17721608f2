// ABOUTME: Upload target implementations consuming the converted GPX files
// ABOUTME: Currently Strava only
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

/// Strava upload integration
pub mod strava;
