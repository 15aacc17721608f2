// ABOUTME: Lap boundary interpolation over the ordered manual-lap record sequence
// ABOUTME: Time math uses day/hour/minute/second components only; see time_diff for limits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

use tracing::warn;

use crate::models::{GeoFix, LapRecord, LapSummary};

/// Compute start/end geometry for every recorded lap.
///
/// Runs as a fold over discovery order: lap 0 starts at its own captured
/// fix, every later lap starts where the previous lap ended. The final
/// lap's end is its captured fix; intermediate laps interpolate their end
/// between the fixes bracketing the marker. Interpolation that cannot run
/// (missing or malformed timestamps, zero time span) degrades to
/// coordinate 0 with a warning and the conversion continues.
pub(crate) fn interpolate_laps(records: &[LapRecord]) -> Vec<LapSummary> {
    let last_index = records.len().saturating_sub(1);
    let mut summaries = Vec::with_capacity(records.len());
    let mut previous_end: Option<(f64, f64)> = None;
    let mut previous_boundary: Option<String> = None;

    for record in records {
        let start_time = if record.index == 0 {
            record.boundary_utc.clone()
        } else {
            previous_boundary.clone()
        };
        previous_boundary.clone_from(&record.boundary_utc);

        let start = match previous_end {
            Some(end) if record.index > 0 => end,
            _ => capture_coords(record.fix_after.as_ref(), record.fix_before.as_ref()),
        };

        let end = if record.index == last_index {
            capture_coords(record.fix_after.as_ref(), record.fix_before.as_ref())
        } else {
            interpolate_boundary(record)
        };
        previous_end = Some(end);

        summaries.push(LapSummary {
            index: record.index,
            start_time,
            elapsed_secs: record.duration_ms.unwrap_or(0.0) / 1000.0,
            distance: record.distance,
            start,
            end,
        });
    }

    summaries
}

/// The captured after-marker fix, falling back to the fix at marker time,
/// then to the 0/0 placeholder.
fn capture_coords(after: Option<&GeoFix>, before: Option<&GeoFix>) -> (f64, f64) {
    after.or(before).map_or((0.0, 0.0), GeoFix::coords)
}

/// Time-proportional position of the lap boundary between the fix last
/// seen before the marker and the first fix after it.
fn interpolate_boundary(record: &LapRecord) -> (f64, f64) {
    let Some((before, after)) = record.fix_before.as_ref().zip(record.fix_after.as_ref()) else {
        warn!(lap = record.index, "no bracketing GPS fixes, lap boundary defaults to 0");
        return (0.0, 0.0);
    };

    let (Some(t), Some(t1), Some(t2)) = (
        record.boundary_utc.as_deref(),
        before.utc.as_deref(),
        after.utc.as_deref(),
    ) else {
        warn!(lap = record.index, "missing fix timestamps, lap boundary defaults to 0");
        return (0.0, 0.0);
    };

    if !looks_like_utc(t1) || !looks_like_utc(t2) {
        warn!(lap = record.index, t1, t2, "failed to interpolate lap boundary");
        return (0.0, 0.0);
    }

    let Some((span, offset)) = time_diff(t1, t2).zip(time_diff(t1, t)) else {
        warn!(lap = record.index, t1, t2, "failed to interpolate lap boundary");
        return (0.0, 0.0);
    };
    if span == 0.0 {
        warn!(lap = record.index, t1, t2, "zero time span between fixes, lap boundary defaults to 0");
        return (0.0, 0.0);
    }

    let fraction = offset / span;
    (
        (after.latitude - before.latitude) * fraction + before.latitude,
        (after.longitude - before.longitude) * fraction + before.longitude,
    )
}

/// Cheap shape check applied before parsing fix timestamps.
fn looks_like_utc(value: &str) -> bool {
    value.contains('T') && value.contains('Z')
}

/// Signed seconds between an earlier and a later UTC timestamp, computed
/// from day-of-month, hour, minute and second components only.
///
/// Month and year never enter the arithmetic; when the later timestamp
/// falls on the 1st of a month the earlier one is shifted back by one day.
/// The result is therefore only meaningful for timestamps within the same
/// month, or within two days of a month boundary. This matches the device
/// logs this tool consumes (fix pairs bracketing one lap marker, seconds
/// apart) and is intentionally not full calendar arithmetic.
pub(crate) fn time_diff(earlier: &str, later: &str) -> Option<f64> {
    let mut secs1 = utc_to_seconds(earlier)?;
    let secs2 = utc_to_seconds(later)?;

    let later_day = day_of_month(later)?;
    if later_day == 1 {
        secs1 -= f64::from(later_day) * 86_400.0;
    }

    Some(secs2 - secs1)
}

/// Seconds represented by the day/hour/minute/second fields of an ISO UTC
/// timestamp (`YYYY-MM-DDTHH:MM:SS[.SSS]Z`).
fn utc_to_seconds(utc: &str) -> Option<f64> {
    let (_, rest) = utc.split_once('T')?;
    let time = rest.split('Z').next().unwrap_or(rest);
    let day = day_of_month(utc)?;

    let mut parts = time.split(':');
    let hours: f64 = parts.next()?.parse().ok()?;
    let minutes: f64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;

    Some(f64::from(day) * 86_400.0 + hours * 3600.0 + minutes * 60.0 + seconds)
}

fn day_of_month(utc: &str) -> Option<u32> {
    let (date, _) = utc.split_once('T')?;
    date.split('-').nth(2)?.parse().ok()
}
