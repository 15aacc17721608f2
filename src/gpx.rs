// ABOUTME: GPX 1.1 document rendering with ClueTrust gpxdata extension elements
// ABOUTME: Whole document renders into memory; file output is temp-write plus rename
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use std::io::Write as _;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;

use crate::errors::{ConvertError, ConvertResult};
use crate::models::{Activity, LapSummary, TrackPoint};

const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
const GPXDATA_NS: &str = "http://www.cluetrust.com/XML/GPXDATA/1/0";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.topografix.com/GPX/1/1 \
     http://www.topografix.com/GPX/1/1/gpx.xsd \
     http://www.cluetrust.com/XML/GPXDATA/1/0 \
     http://www.cluetrust.com/Schemas/gpxdata10.xsd";

type XmlWriter = Writer<Vec<u8>>;

/// Render a converted activity as a GPX 1.1 document.
///
/// Track points form one `<trkseg>`; manual laps go into a trailing
/// root-level `<extensions>` block as `<gpxdata:lap>` elements. Generic
/// GPX readers ignore the namespaced extension elements.
///
/// # Errors
///
/// Only XML writer failures, which with an in-memory sink means none in
/// practice.
pub fn render(activity: &Activity) -> ConvertResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;

    let mut gpx = BytesStart::new("gpx");
    gpx.push_attribute(("xmlns", GPX_NS));
    gpx.push_attribute(("version", "1.1"));
    gpx.push_attribute(("creator", "ambitsync"));
    gpx.push_attribute(("xmlns:xsi", XSI_NS));
    gpx.push_attribute(("xmlns:gpxdata", GPXDATA_NS));
    gpx.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(gpx))?;

    writer.write_event(Event::Start(BytesStart::new("trk")))?;
    if let Some(category) = activity.category {
        text_element(&mut writer, "type", category.gpx_type())?;
    }
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
    for point in &activity.points {
        track_point(&mut writer, point)?;
    }
    writer.write_event(Event::End(BytesEnd::new("trkseg")))?;
    writer.write_event(Event::End(BytesEnd::new("trk")))?;

    writer.write_event(Event::Start(BytesStart::new("extensions")))?;
    for lap in &activity.laps {
        lap_element(&mut writer, lap)?;
    }
    writer.write_event(Event::End(BytesEnd::new("extensions")))?;

    writer.write_event(Event::End(BytesEnd::new("gpx")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Write rendered output so that no partial file is ever observable: the
/// bytes land in a temporary file in the destination directory, which is
/// renamed over the target only once fully written.
///
/// # Errors
///
/// Returns [`ConvertError::Io`] when the temporary file cannot be created,
/// written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> ConvertResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.persist(path)
        .map_err(|persist| ConvertError::Io {
            source: persist.error,
        })?;
    Ok(())
}

fn track_point(writer: &mut XmlWriter, point: &TrackPoint) -> ConvertResult<()> {
    let lat = format!("{}", point.latitude);
    let lon = format!("{}", point.longitude);
    let mut trkpt = BytesStart::new("trkpt");
    trkpt.push_attribute(("lat", lat.as_str()));
    trkpt.push_attribute(("lon", lon.as_str()));
    writer.write_event(Event::Start(trkpt))?;

    if let Some(elevation) = point.elevation {
        text_element(writer, "ele", &format!("{elevation}"))?;
    }
    if let Some(time) = point.time.as_deref().filter(|time| !time.is_empty()) {
        text_element(writer, "time", time)?;
    }

    let ext = &point.extensions;
    if !ext.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("extensions")))?;
        if let Some(hr) = ext.heart_rate {
            text_element(writer, "gpxdata:hr", &hr.to_string())?;
        }
        if let Some(cadence) = ext.cadence {
            text_element(writer, "gpxdata:cadence", &cadence.to_string())?;
        }
        if let Some(power) = ext.power {
            text_element(writer, "gpxdata:power", &power.to_string())?;
        }
        if let Some(temperature) = ext.temperature {
            text_element(writer, "gpxdata:temp", &format!("{temperature}"))?;
        }
        if let Some(speed) = ext.speed {
            text_element(writer, "gpxdata:speed", &format!("{speed}"))?;
        }
        if let Some(pressure) = ext.sea_level_pressure {
            text_element(writer, "gpxdata:SeaLevelPressure", &format!("{pressure}"))?;
        }
        writer.write_event(Event::End(BytesEnd::new("extensions")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("trkpt")))?;
    Ok(())
}

fn lap_element(writer: &mut XmlWriter, lap: &LapSummary) -> ConvertResult<()> {
    let mut element = BytesStart::new("gpxdata:lap");
    element.push_attribute(("xmlns", GPXDATA_NS));
    writer.write_event(Event::Start(element))?;

    text_element(writer, "index", &lap.index.to_string())?;
    text_element(writer, "startTime", lap.start_time.as_deref().unwrap_or(""))?;
    text_element(writer, "elapsedTime", &format!("{}", lap.elapsed_secs))?;
    let distance = lap.distance.map(|meters| format!("{meters}"));
    text_element(writer, "distance", distance.as_deref().unwrap_or(""))?;

    coordinate_element(writer, "startPoint", lap.start)?;
    coordinate_element(writer, "endPoint", lap.end)?;

    text_element(writer, "intensity", "active")?;
    let mut trigger = BytesStart::new("trigger");
    trigger.push_attribute(("kind", "manual"));
    writer.write_event(Event::Start(trigger))?;
    writer.write_event(Event::Text(BytesText::new(" ")))?;
    writer.write_event(Event::End(BytesEnd::new("trigger")))?;

    // schema-required filler; the device does not report these per lap
    text_element(writer, "calories", "0")?;
    summary_element(writer, "avg", "hr")?;
    summary_element(writer, "max", "hr")?;
    summary_element(writer, "avg", "cadence")?;
    summary_element(writer, "max", "speed")?;

    writer.write_event(Event::End(BytesEnd::new("gpxdata:lap")))?;
    Ok(())
}

fn coordinate_element(
    writer: &mut XmlWriter,
    name: &str,
    (lat, lon): (f64, f64),
) -> ConvertResult<()> {
    let lat = format!("{lat}");
    let lon = format!("{lon}");
    let mut element = BytesStart::new(name);
    element.push_attribute(("lat", lat.as_str()));
    element.push_attribute(("lon", lon.as_str()));
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(" ")))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn summary_element(writer: &mut XmlWriter, kind: &str, name: &str) -> ConvertResult<()> {
    let mut element = BytesStart::new("summary");
    element.push_attribute(("kind", kind));
    element.push_attribute(("name", name));
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new("0")))?;
    writer.write_event(Event::End(BytesEnd::new("summary")))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> ConvertResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityCategory, PointExtensions};

    fn small_activity() -> Activity {
        Activity {
            category: Some(ActivityCategory::Run),
            points: vec![TrackPoint {
                latitude: 50.0,
                longitude: 10.0,
                elevation: Some(1200.0),
                time: Some("2025-07-12T10:00:00Z".to_owned()),
                extensions: PointExtensions {
                    heart_rate: Some(150),
                    ..PointExtensions::default()
                },
            }],
            laps: vec![LapSummary {
                index: 0,
                start_time: Some("2025-07-12T10:00:30Z".to_owned()),
                elapsed_secs: 30.0,
                distance: Some(120.0),
                start: (50.0, 10.0),
                end: (50.001, 10.001),
            }],
        }
    }

    #[test]
    fn test_render_track_point() {
        let gpx = render(&small_activity()).expect("renders");
        assert!(gpx.contains(r#"<trkpt lat="50" lon="10">"#));
        assert!(gpx.contains("<ele>1200</ele>"));
        assert!(gpx.contains("<time>2025-07-12T10:00:00Z</time>"));
        assert!(gpx.contains("<gpxdata:hr>150</gpxdata:hr>"));
        assert!(gpx.contains("<type>Run</type>"));
    }

    #[test]
    fn test_render_lap_extension() {
        let gpx = render(&small_activity()).expect("renders");
        assert!(gpx.contains("<gpxdata:lap xmlns=\"http://www.cluetrust.com/XML/GPXDATA/1/0\">"));
        assert!(gpx.contains("<index>0</index>"));
        assert!(gpx.contains("<elapsedTime>30</elapsedTime>"));
        assert!(gpx.contains(r#"<endPoint lat="50.001" lon="10.001">"#));
        assert!(gpx.contains(r#"<trigger kind="manual">"#));
        assert!(gpx.contains("<calories>0</calories>"));
        assert!(gpx.contains(r#"<summary kind="max" name="speed">0</summary>"#));
    }

    #[test]
    fn test_empty_extension_bag_omitted() {
        let mut activity = small_activity();
        activity.points[0].extensions = PointExtensions::default();
        activity.laps.clear();
        let gpx = render(&activity).expect("renders");
        assert!(!gpx.contains("gpxdata:hr"));
        // only the root-level lap block remains, no point-level bag
        assert_eq!(gpx.matches("<extensions>").count(), 1);
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out.gpx");
        write_atomic(&target, b"<gpx/>").expect("writes");
        assert_eq!(std::fs::read(&target).expect("read back"), b"<gpx/>");
    }
}
