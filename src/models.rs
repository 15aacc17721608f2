// ABOUTME: Typed representation of Openambit log documents and conversion outputs
// ABOUTME: Samples carry optional fields; track points and lap records are the emitted units
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ambitsync contributors

/// Discriminant of a log sample.
///
/// Openambit tags every sample with a `Type` element. The variants here are
/// the ones the converter treats specially; everything else (periodic sensor
/// rows, device events) flows through the generic carry-forward path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleKind {
    /// Full GPS fix
    GpsBase,
    /// Positional echo of the preceding GPS-bearing sample
    Position,
    /// Lap marker with a nested `Lap` record
    LapInfo,
    /// Inter-beat-interval burst from the heart-rate belt
    Ibi,
    /// Periodic sensor row
    Periodic,
    /// Any other sample type
    Other(String),
}

impl SampleKind {
    /// Parse the `Type` element text of a sample.
    #[must_use]
    pub fn from_log_value(value: &str) -> Self {
        match value {
            "gps-base" => Self::GpsBase,
            "position" => Self::Position,
            "lap-info" => Self::LapInfo,
            "ibi" => Self::Ibi,
            "periodic" => Self::Periodic,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Nested lap record of a `lap-info` sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LapInfo {
    /// Lap trigger type; only `"Manual"` laps produce output
    pub kind: Option<String>,
    /// Wall-clock time of the lap event as recorded by the device
    pub date_time: Option<String>,
    /// Lap duration in milliseconds
    pub duration_ms: Option<f64>,
    /// Lap distance in meters
    pub distance: Option<f64>,
}

/// One record from the device log's ordered sample stream.
///
/// Every field except `kind` is optional; the converter resolves absent
/// fields from the last observed value (carry-forward), with the exception
/// of latitude/longitude which are never carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    /// Sample type discriminant
    pub kind: Option<SampleKind>,
    /// UTC timestamp, ISO 8601 with seconds
    pub utc: Option<String>,
    /// Latitude in degrees scaled by 1e7
    pub latitude: Option<i64>,
    /// Longitude in degrees scaled by 1e7
    pub longitude: Option<i64>,
    /// Altitude in meters
    pub altitude: Option<f64>,
    /// Heart rate in beats per minute
    pub heart_rate: Option<u32>,
    /// Cadence in revolutions per minute
    pub cadence: Option<u32>,
    /// Bike power in watts
    pub bike_power: Option<u32>,
    /// Speed in centi-units (device value is 100x m/s)
    pub speed: Option<f64>,
    /// Temperature in deci-degrees Celsius
    pub temperature: Option<f64>,
    /// Sea-level air pressure
    pub sea_level_pressure: Option<f64>,
    /// Batch tag identifying an IBI burst; consecutive samples may repeat it
    pub ibi_time: Option<String>,
    /// Inter-beat intervals in milliseconds
    pub ibi: Vec<u32>,
    /// Nested lap record for `lap-info` samples
    pub lap: Option<LapInfo>,
}

/// Log header metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Device activity type name, e.g. `"Running"`
    pub activity_type_name: Option<String>,
}

/// A fully parsed Openambit log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFile {
    /// Header metadata
    pub header: Header,
    /// Ordered sample stream
    pub samples: Vec<Sample>,
}

/// Scalar sensor values attached to an emitted track point.
///
/// Each field is present only when it resolved to a value for that point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointExtensions {
    /// Heart rate, bpm
    pub heart_rate: Option<u32>,
    /// Cadence, rpm
    pub cadence: Option<u32>,
    /// Bike power, watts
    pub power: Option<u32>,
    /// Temperature, degrees Celsius
    pub temperature: Option<f64>,
    /// Speed, m/s
    pub speed: Option<f64>,
    /// Sea-level pressure
    pub sea_level_pressure: Option<f64>,
}

impl PointExtensions {
    /// True when no field resolved to a value.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.cadence.is_none()
            && self.power.is_none()
            && self.temperature.is_none()
            && self.speed.is_none()
            && self.sea_level_pressure.is_none()
    }
}

/// One emitted position record in the output track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    /// Latitude, degrees
    pub latitude: f64,
    /// Longitude, degrees
    pub longitude: f64,
    /// Elevation, meters
    pub elevation: Option<f64>,
    /// UTC timestamp
    pub time: Option<String>,
    /// Sensor extension bag
    pub extensions: PointExtensions,
}

/// A GPS fix together with the UTC tag of the sample that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFix {
    /// Latitude, degrees
    pub latitude: f64,
    /// Longitude, degrees
    pub longitude: f64,
    /// UTC timestamp of the fix, if the sample carried one
    pub utc: Option<String>,
}

impl GeoFix {
    /// Latitude/longitude pair.
    #[must_use]
    pub const fn coords(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// One manual lap marker collected during the sample pass.
///
/// `fix_before` is the last GPS fix seen when the marker arrived;
/// `fix_after` is the first fix seen afterwards, written exactly once.
/// Record order is discovery order and the interpolation pass depends on
/// it: each lap's start point is the previous lap's derived end point.
#[derive(Debug, Clone, PartialEq)]
pub struct LapRecord {
    /// 0-based sequence index in discovery order
    pub index: usize,
    /// Wall-clock time of the lap event
    pub date_time: Option<String>,
    /// Lap duration, milliseconds
    pub duration_ms: Option<f64>,
    /// Lap distance, meters
    pub distance: Option<f64>,
    /// UTC at the lap boundary (the marker sample's own timestamp)
    pub boundary_utc: Option<String>,
    /// Latest GPS fix at the moment the marker was seen
    pub fix_before: Option<GeoFix>,
    /// First GPS fix after the marker
    pub fix_after: Option<GeoFix>,
}

/// Computed lap boundary geometry and pass-through fields, ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct LapSummary {
    /// 0-based lap index
    pub index: usize,
    /// UTC the lap started
    pub start_time: Option<String>,
    /// Elapsed time, seconds
    pub elapsed_secs: f64,
    /// Distance, meters
    pub distance: Option<f64>,
    /// Derived start coordinates (lat, lon)
    pub start: (f64, f64),
    /// Derived end coordinates (lat, lon)
    pub end: (f64, f64),
}

/// A fully converted activity, ready for GPX rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Mapped activity category, if the header type was known
    pub category: Option<ActivityCategory>,
    /// Emitted track points in sample order
    pub points: Vec<TrackPoint>,
    /// Interpolated manual laps in discovery order
    pub laps: Vec<LapSummary>,
}

/// Output activity category.
///
/// Device activity names map onto a small fixed set of track categories;
/// names outside the table are an [`UnknownActivityType`] condition.
///
/// [`UnknownActivityType`]: crate::errors::ConvertError::UnknownActivityType
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityCategory {
    /// Mountaineering
    Hike,
    /// Running and multisport
    Run,
    /// Cycling
    Ride,
    /// Open-water swimming
    Swim,
}

impl ActivityCategory {
    /// Map a device activity type name onto its output category.
    #[must_use]
    pub fn from_device_name(name: &str) -> Option<Self> {
        match name {
            "Mountaineering" => Some(Self::Hike),
            "Running" | "Multisport" => Some(Self::Run),
            "Cycling" => Some(Self::Ride),
            "Openwater swimming" => Some(Self::Swim),
            _ => None,
        }
    }

    /// The `<type>` element text for this category.
    #[must_use]
    pub const fn gpx_type(self) -> &'static str {
        match self {
            Self::Hike => "Hike",
            Self::Run => "Run",
            Self::Ride => "Ride",
            Self::Swim => "Swim",
        }
    }
}
