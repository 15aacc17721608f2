// ABOUTME: Streaming XML parser turning Openambit *.log files into typed LogFile documents
// ABOUTME: Structural absence of Log or Samples is a MalformedInput error; bad scalars degrade to absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::fs;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

use crate::errors::{ConvertError, ConvertResult};
use crate::models::{Header, LapInfo, LogFile, Sample, SampleKind};

/// Parse an Openambit log file from disk.
///
/// The whole document is read into memory first; logs are single-activity
/// files and comfortably fit.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] when the file cannot be read and any error
/// of [`parse_log`] otherwise.
pub fn parse_log_file(path: &Path) -> ConvertResult<LogFile> {
    let contents = fs::read_to_string(path)?;
    parse_log(&contents)
}

/// Parse an Openambit log document.
///
/// # Errors
///
/// Returns [`ConvertError::MalformedInput`] when the `Log` element or its
/// `Samples` child is absent, and [`ConvertError::Xml`] when the document
/// is not well-formed.
pub fn parse_log(input: &str) -> ConvertResult<LogFile> {
    let mut reader = Reader::from_str(input);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut stack: Vec<String> = Vec::new();
    let mut header = Header::default();
    let mut samples = Vec::new();
    let mut sample: Option<Sample> = None;
    let mut lap: Option<LapInfo> = None;
    let mut saw_log = false;
    let mut saw_samples = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                match name.as_str() {
                    // `Log` must sit directly under the document root
                    "Log" if stack.len() == 1 => saw_log = true,
                    "Samples" if saw_log && stack.last().is_some_and(|p| p == "Log") => {
                        saw_samples = true;
                    }
                    "Sample" if stack.last().is_some_and(|p| p == "Samples") => {
                        sample = Some(Sample::default());
                    }
                    "Lap" if sample.is_some() => lap = Some(LapInfo::default()),
                    _ => {}
                }
                stack.push(name);
            }
            Event::Empty(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                match name.as_str() {
                    "Samples" if saw_log && stack.last().is_some_and(|p| p == "Log") => {
                        saw_samples = true;
                    }
                    "Sample" if stack.last().is_some_and(|p| p == "Samples") => {
                        samples.push(Sample::default());
                    }
                    _ => {}
                }
            }
            Event::End(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
                stack.pop();
                match name.as_str() {
                    "Lap" => {
                        if let Some(current) = sample.as_mut() {
                            current.lap = lap.take();
                        }
                    }
                    "Sample" => {
                        if let Some(finished) = sample.take() {
                            samples.push(finished);
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                let Some(leaf) = stack.last().map(String::as_str) else {
                    continue;
                };
                if let Some(current_lap) = lap.as_mut() {
                    fill_lap_field(current_lap, leaf, &value);
                } else if let Some(current) = sample.as_mut() {
                    fill_sample_field(current, leaf, &value);
                } else if leaf == "ActivityTypeName"
                    && stack.iter().any(|element| element == "Header")
                {
                    header.activity_type_name = Some(value.into_owned());
                }
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_log {
        return Err(ConvertError::MalformedInput { element: "Log" });
    }
    if !saw_samples {
        return Err(ConvertError::MalformedInput { element: "Samples" });
    }

    Ok(LogFile { header, samples })
}

fn fill_sample_field(sample: &mut Sample, leaf: &str, value: &str) {
    match leaf {
        "Type" => sample.kind = Some(SampleKind::from_log_value(value)),
        "UTC" => sample.utc = Some(value.to_owned()),
        "Latitude" => sample.latitude = parse_scalar(leaf, value),
        "Longitude" => sample.longitude = parse_scalar(leaf, value),
        "Altitude" => sample.altitude = parse_scalar(leaf, value),
        "HR" => sample.heart_rate = parse_scalar(leaf, value),
        "Cadence" => sample.cadence = parse_scalar(leaf, value),
        "BikePower" => sample.bike_power = parse_scalar(leaf, value),
        "Speed" => sample.speed = parse_scalar(leaf, value),
        "Temperature" => sample.temperature = parse_scalar(leaf, value),
        "SeaLevelPressure" => sample.sea_level_pressure = parse_scalar(leaf, value),
        "Time" => sample.ibi_time = Some(value.to_owned()),
        "IBI" => {
            if let Some(interval) = parse_scalar(leaf, value) {
                sample.ibi.push(interval);
            }
        }
        _ => {}
    }
}

fn fill_lap_field(lap: &mut LapInfo, leaf: &str, value: &str) {
    match leaf {
        "Type" => lap.kind = Some(value.to_owned()),
        "DateTime" => lap.date_time = Some(value.to_owned()),
        "Duration" => lap.duration_ms = parse_scalar(leaf, value),
        "Distance" => lap.distance = parse_scalar(leaf, value),
        _ => {}
    }
}

/// Numeric field text that fails to parse reads as absent, so carry-forward
/// resolution treats it like a missing element.
fn parse_scalar<T: FromStr>(leaf: &str, value: &str) -> Option<T> {
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            debug!(element = leaf, text = value, "dropping unparseable sample field");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r"<sml><Log><Header><ActivityTypeName>Running</ActivityTypeName></Header><Samples>
        <Sample><Type>gps-base</Type><Latitude>500000000</Latitude><Longitude>100000000</Longitude><UTC>2025-07-12T10:00:00Z</UTC></Sample>
        <Sample><Type>lap-info</Type><UTC>2025-07-12T10:00:30Z</UTC><Lap><Type>Manual</Type><DateTime>2025-07-12T12:00:30</DateTime><Duration>30000</Duration><Distance>120</Distance></Lap></Sample>
        <Sample><Type>ibi</Type><Time>63500</Time><IBI>900</IBI><IBI>910</IBI></Sample>
    </Samples></Log></sml>";

    #[test]
    fn test_parse_header_and_samples() {
        let log = parse_log(MINIMAL).expect("minimal log parses");
        assert_eq!(log.header.activity_type_name.as_deref(), Some("Running"));
        assert_eq!(log.samples.len(), 3);

        let gps = &log.samples[0];
        assert_eq!(gps.kind, Some(SampleKind::GpsBase));
        assert_eq!(gps.latitude, Some(500_000_000));
        assert_eq!(gps.longitude, Some(100_000_000));
        assert_eq!(gps.utc.as_deref(), Some("2025-07-12T10:00:00Z"));
    }

    #[test]
    fn test_parse_nested_lap() {
        let log = parse_log(MINIMAL).expect("minimal log parses");
        let lap = log.samples[1].lap.as_ref().expect("lap record");
        assert_eq!(lap.kind.as_deref(), Some("Manual"));
        assert_eq!(lap.duration_ms, Some(30_000.0));
        assert_eq!(lap.distance, Some(120.0));
        // the sample's own Type stays separate from Lap/Type
        assert_eq!(log.samples[1].kind, Some(SampleKind::LapInfo));
    }

    #[test]
    fn test_parse_ibi_batch() {
        let log = parse_log(MINIMAL).expect("minimal log parses");
        let ibi = &log.samples[2];
        assert_eq!(ibi.kind, Some(SampleKind::Ibi));
        assert_eq!(ibi.ibi_time.as_deref(), Some("63500"));
        assert_eq!(ibi.ibi, vec![900, 910]);
    }

    #[test]
    fn test_missing_log_is_malformed() {
        let err = parse_log("<sml><Other/></sml>").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MalformedInput { element: "Log" }
        ));
    }

    #[test]
    fn test_missing_samples_is_malformed() {
        let err = parse_log("<sml><Log><Header/></Log></sml>").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MalformedInput { element: "Samples" }
        ));
    }

    #[test]
    fn test_unparseable_scalar_reads_as_absent() {
        let log = parse_log(
            "<sml><Log><Samples><Sample><Altitude>n/a</Altitude><Cadence>77</Cadence></Sample></Samples></Log></sml>",
        )
        .expect("structurally valid log parses");
        assert_eq!(log.samples[0].altitude, None);
        assert_eq!(log.samples[0].cadence, Some(77));
    }
}
