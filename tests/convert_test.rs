// ABOUTME: Integration tests for the sample stream processor and GPX output
// ABOUTME: Covers carry-forward, position skipping, activity mapping and failure atomicity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

mod common;

use ambitsync::convert::{convert_file, convert_str, process_log, ConvertOptions};
use ambitsync::errors::ConvertError;
use ambitsync::parser::parse_log;

use common::{gps_sample, init_test_logging, log_document};

fn process(samples: &str) -> ambitsync::models::Activity {
    let log = parse_log(&log_document("Running", samples)).expect("log parses");
    process_log(&log, &ConvertOptions::default()).expect("conversion succeeds")
}

#[test]
fn test_three_sample_round_trip() {
    init_test_logging();
    let samples = format!(
        "{}{}{}",
        gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z"),
        "<Sample><HR>150</HR><UTC>2025-07-12T10:00:05Z</UTC></Sample>",
        gps_sample(500_001_000, 100_000_500, "2025-07-12T10:00:10Z"),
    );
    let activity = process(&samples);

    // the HR-only sample has no position and emits nothing
    assert_eq!(activity.points.len(), 2);

    let first = &activity.points[0];
    assert!((first.latitude - 50.0).abs() < 1e-9);
    assert!((first.longitude - 10.0).abs() < 1e-9);
    assert!(first.extensions.is_empty());

    let second = &activity.points[1];
    assert!((second.latitude - 50.0001).abs() < 1e-9);
    assert!((second.longitude - 10.00005).abs() < 1e-9);
    // heart rate carried forward from the sample in between
    assert_eq!(second.extensions.heart_rate, Some(150));
}

#[test]
fn test_position_samples_emit_nothing_and_touch_nothing() {
    init_test_logging();
    let position =
        "<Sample><Type>position</Type><Latitude>999999999</Latitude>\
         <Longitude>999999999</Longitude><Altitude>9999</Altitude></Sample>";
    let tail = gps_sample(500_001_000, 100_000_500, "2025-07-12T10:00:10Z");

    let mut first_fix = gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z");
    first_fix = first_fix.replace("</Sample>", "<Altitude>1200</Altitude></Sample>");

    let once = process(&format!("{first_fix}{position}{tail}"));
    let twice = process(&format!("{first_fix}{position}{position}{tail}"));

    // skipping is idempotent and leaves carried state alone
    assert_eq!(once, twice);
    assert_eq!(once.points.len(), 2);
    assert_eq!(once.points[1].elevation, Some(1200.0));
}

#[test]
fn test_carry_forward_until_overwritten() {
    init_test_logging();
    let samples = format!(
        "{}{}{}{}",
        "<Sample><Cadence>80</Cadence></Sample>",
        gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z"),
        gps_sample(500_001_000, 100_000_500, "2025-07-12T10:00:10Z"),
        "<Sample><Type>gps-base</Type><Latitude>500002000</Latitude>\
         <Longitude>100001000</Longitude><Cadence>90</Cadence></Sample>",
    );
    let activity = process(&samples);
    assert_eq!(activity.points.len(), 3);
    assert_eq!(activity.points[0].extensions.cadence, Some(80));
    assert_eq!(activity.points[1].extensions.cadence, Some(80));
    assert_eq!(activity.points[2].extensions.cadence, Some(90));
}

#[test]
fn test_heart_rate_derived_from_ibi() {
    init_test_logging();
    let samples = format!(
        "{}{}",
        "<Sample><Type>ibi</Type><Time>63500</Time><IBI>1000</IBI></Sample>",
        gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z"),
    );
    let activity = process(&samples);
    assert_eq!(activity.points.len(), 1);
    assert_eq!(activity.points[0].extensions.heart_rate, Some(60));
}

#[test]
fn test_activity_type_mapping_in_output() {
    init_test_logging();
    let point = gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z");

    let ride = convert_str(
        &log_document("Cycling", &point),
        &ConvertOptions::default(),
    )
    .expect("converts");
    assert!(ride.contains("<type>Ride</type>"));

    let run = convert_str(
        &log_document("Multisport", &point),
        &ConvertOptions::default(),
    )
    .expect("converts");
    assert!(run.contains("<type>Run</type>"));
}

#[test]
fn test_unknown_activity_type_warns_by_default_fails_strict() {
    init_test_logging();
    let document = log_document("Snorkeling", &gps_sample(500_000_000, 100_000_000, "t"));

    let lax = convert_str(&document, &ConvertOptions::default()).expect("lax mode converts");
    assert!(!lax.contains("<type>"));

    let strict = ConvertOptions {
        strict: true,
        ..ConvertOptions::default()
    };
    match convert_str(&document, &strict) {
        Err(ConvertError::UnknownActivityType { name }) => assert_eq!(name, "Snorkeling"),
        other => panic!("expected UnknownActivityType, got {other:?}"),
    }
}

#[test]
fn test_rendered_document_structure() {
    init_test_logging();
    let samples = format!(
        "{}{}",
        "<Sample><HR>150</HR><Speed>500</Speed></Sample>",
        gps_sample(500_000_000, 100_000_000, "2025-07-12T10:00:00Z"),
    );
    let gpx = convert_str(
        &log_document("Running", &samples),
        &ConvertOptions::default(),
    )
    .expect("converts");

    assert!(gpx.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
    assert!(gpx.contains(r#"xmlns="http://www.topografix.com/GPX/1/1""#));
    assert!(gpx.contains(r#"xmlns:gpxdata="http://www.cluetrust.com/XML/GPXDATA/1/0""#));
    assert!(gpx.contains(r#"<trkpt lat="50" lon="10">"#));
    assert!(gpx.contains("<time>2025-07-12T10:00:00Z</time>"));
    assert!(gpx.contains("<gpxdata:hr>150</gpxdata:hr>"));
    assert!(gpx.contains("<gpxdata:speed>5</gpxdata:speed>"));
}

#[test]
fn test_malformed_input_leaves_no_output() {
    init_test_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("broken.log");
    let output = dir.path().join("broken.gpx");
    std::fs::write(&input, "<sml><NotALog/></sml>").expect("write input");

    let result = convert_file(&input, &output, &ConvertOptions::default());
    assert!(matches!(
        result,
        Err(ConvertError::MalformedInput { element: "Log" })
    ));
    assert!(!output.exists());
}

#[test]
fn test_missing_samples_is_malformed() {
    init_test_logging();
    let result = convert_str(
        "<sml><Log><Header/></Log></sml>",
        &ConvertOptions::default(),
    );
    assert!(matches!(
        result,
        Err(ConvertError::MalformedInput { element: "Samples" })
    ));
}
