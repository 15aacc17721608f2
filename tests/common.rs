// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Provides quiet logging setup and log-document builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors
#![allow(dead_code)]

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process).
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Wrap sample markup in a full log document.
pub fn log_document(activity: &str, samples: &str) -> String {
    format!(
        "<sml><Log><Header><ActivityTypeName>{activity}</ActivityTypeName></Header>\
         <Samples>{samples}</Samples></Log></sml>"
    )
}

/// A `gps-base` sample with a fix and timestamp.
pub fn gps_sample(lat: i64, lon: i64, utc: &str) -> String {
    format!(
        "<Sample><Type>gps-base</Type><Latitude>{lat}</Latitude>\
         <Longitude>{lon}</Longitude><UTC>{utc}</UTC></Sample>"
    )
}

/// A manual `lap-info` sample.
pub fn manual_lap_sample(utc: &str, duration_ms: u64, distance: u64) -> String {
    format!(
        "<Sample><Type>lap-info</Type><UTC>{utc}</UTC><Lap><Type>Manual</Type>\
         <DateTime>{utc}</DateTime><Duration>{duration_ms}</Duration>\
         <Distance>{distance}</Distance></Lap></Sample>"
    )
}
