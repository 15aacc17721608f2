// ABOUTME: Single-pass sample stream processor turning parsed logs into activities
// ABOUTME: Carries last-observed field state per conversion; position samples are skipped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

/// IBI-to-heart-rate estimation
pub mod heart_rate;

/// Lap boundary interpolation
pub mod laps;

use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{ConvertError, ConvertResult};
use crate::gpx;
use crate::models::{
    Activity, ActivityCategory, GeoFix, LapRecord, LogFile, PointExtensions, SampleKind,
    TrackPoint,
};
use crate::parser;
use self::heart_rate::HeartRateEstimator;

/// Degrees per raw device coordinate unit (latitude/longitude are scaled by 1e7)
const COORDINATE_SCALE: f64 = 10_000_000.0;

/// Knobs for one conversion run.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Collapse each IBI batch into its mean before deriving heart rates
    pub average_hr: bool,
    /// Fail on unknown activity types instead of omitting `<type>`
    pub strict: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            average_hr: true,
            strict: false,
        }
    }
}

/// Last successfully observed value per optional field.
///
/// Once a field has been seen its value persists across samples until
/// overwritten; a momentary absence never resets a field to unknown.
/// Speed and temperature are stored already scaled to output units.
#[derive(Debug, Default)]
struct CarriedFields {
    utc: Option<String>,
    altitude: Option<f64>,
    heart_rate: Option<u32>,
    cadence: Option<u32>,
    power: Option<u32>,
    speed: Option<f64>,
    temperature: Option<f64>,
    sea_level_pressure: Option<f64>,
}

/// Convert one log file on disk into a GPX file.
///
/// Output is written to a temporary file next to the destination and
/// renamed into place on success, so a failed conversion leaves no
/// partial artifact behind.
///
/// # Errors
///
/// Any [`ConvertError`]: unreadable or malformed input, an unknown
/// activity type under [`ConvertOptions::strict`], or output I/O.
pub fn convert_file(input: &Path, output: &Path, options: &ConvertOptions) -> ConvertResult<()> {
    let log = parser::parse_log_file(input)?;
    let activity = process_log(&log, options)?;
    let rendered = gpx::render(&activity)?;
    gpx::write_atomic(output, rendered.as_bytes())?;
    debug!(points = activity.points.len(), laps = activity.laps.len(), "conversion finished");
    Ok(())
}

/// Convert an in-memory log document straight to GPX text.
///
/// # Errors
///
/// Same failure modes as [`convert_file`] minus file I/O.
pub fn convert_str(input: &str, options: &ConvertOptions) -> ConvertResult<String> {
    let log = parser::parse_log(input)?;
    let activity = process_log(&log, options)?;
    gpx::render(&activity)
}

/// Run the forward sample pass and the lap interpolation pass.
///
/// # Errors
///
/// Returns [`ConvertError::UnknownActivityType`] when the header names an
/// unmapped activity and `options.strict` is set.
pub fn process_log(log: &LogFile, options: &ConvertOptions) -> ConvertResult<Activity> {
    let category = resolve_category(log.header.activity_type_name.as_deref(), options.strict)?;

    let mut state = CarriedFields::default();
    let mut estimator = HeartRateEstimator::new(options.average_hr);
    let mut points = Vec::new();
    let mut lap_records: Vec<LapRecord> = Vec::new();
    let mut latest_fix: Option<GeoFix> = None;
    let mut pending_capture: Option<usize> = None;

    for sample in &log.samples {
        // Position samples repeat the payload of the preceding GPS-bearing
        // sample; skipping them up front keeps state untouched.
        if sample.kind == Some(SampleKind::Position) {
            continue;
        }

        let utc = sample.utc.clone().or_else(|| state.utc.clone());
        let altitude = sample.altitude.or(state.altitude);
        let cadence = sample.cadence.or(state.cadence);
        let power = sample.bike_power.or(state.power);
        let speed = sample.speed.map(|centi| centi / 100.0).or(state.speed);
        let temperature = sample.temperature.map(|deci| deci / 10.0).or(state.temperature);
        let sea_level_pressure = sample.sea_level_pressure.or(state.sea_level_pressure);

        // direct reading, else carried value, else IBI-derived estimate
        let heart_rate = sample
            .heart_rate
            .or(state.heart_rate)
            .or_else(|| estimator.observe(sample));

        if sample.kind == Some(SampleKind::LapInfo) {
            if let Some(lap) = sample.lap.as_ref().filter(|lap| lap.kind.as_deref() == Some("Manual"))
            {
                lap_records.push(LapRecord {
                    index: lap_records.len(),
                    date_time: lap.date_time.clone(),
                    duration_ms: lap.duration_ms,
                    distance: lap.distance,
                    boundary_utc: sample.utc.clone(),
                    fix_before: latest_fix.clone(),
                    fix_after: None,
                });
                pending_capture = Some(lap_records.len() - 1);
            }
        }

        // Carry-forward never applies to position: only a directly present
        // lat/lon pair emits a track point or advances the latest fix.
        if let (Some(lat_raw), Some(lon_raw)) = (sample.latitude, sample.longitude) {
            let fix = GeoFix {
                latitude: lat_raw as f64 / COORDINATE_SCALE,
                longitude: lon_raw as f64 / COORDINATE_SCALE,
                utc: sample.utc.clone(),
            };

            if let Some(pending) = pending_capture.take() {
                if let Some(record) = lap_records.get_mut(pending) {
                    record.fix_after = Some(fix.clone());
                }
            }

            points.push(TrackPoint {
                latitude: fix.latitude,
                longitude: fix.longitude,
                elevation: altitude,
                time: utc.clone(),
                extensions: PointExtensions {
                    heart_rate,
                    cadence,
                    power,
                    temperature,
                    speed,
                    sea_level_pressure,
                },
            });
            latest_fix = Some(fix);
        }

        state.utc = utc;
        state.altitude = altitude;
        state.heart_rate = heart_rate;
        state.cadence = cadence;
        state.power = power;
        state.speed = speed;
        state.temperature = temperature;
        state.sea_level_pressure = sea_level_pressure;
    }

    let laps = laps::interpolate_laps(&lap_records);

    Ok(Activity {
        category,
        points,
        laps,
    })
}

fn resolve_category(name: Option<&str>, strict: bool) -> ConvertResult<Option<ActivityCategory>> {
    let Some(name) = name else {
        return Ok(None);
    };
    match ActivityCategory::from_device_name(name) {
        Some(category) => Ok(Some(category)),
        None if strict => Err(ConvertError::UnknownActivityType {
            name: name.to_owned(),
        }),
        None => {
            warn!(activity = name, "unknown activity type, omitting <type> element");
            Ok(None)
        }
    }
}
