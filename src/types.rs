//! Core types for the Synheart Seed pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! seeding pipeline: time windows, samples, storable records, and permissions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Kind of physiological metric a record carries
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    HeartRate,
    HeartRateVariability,
    SkinTemperature,
}

impl MetricKind {
    /// All supported kinds, in canonical order
    pub const ALL: [MetricKind; 3] = [
        MetricKind::HeartRate,
        MetricKind::HeartRateVariability,
        MetricKind::SkinTemperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::HeartRate => "heart_rate",
            MetricKind::HeartRateVariability => "heart_rate_variability",
            MetricKind::SkinTemperature => "skin_temperature",
        }
    }

    /// Parse a caller-supplied kind token. Returns `None` for unknown tokens;
    /// the request layer turns that into a descriptive rejection.
    pub fn from_token(token: &str) -> Option<MetricKind> {
        match token {
            "heart_rate" => Some(MetricKind::HeartRate),
            "heart_rate_variability" => Some(MetricKind::HeartRateVariability),
            "skin_temperature" => Some(MetricKind::SkinTemperature),
            _ => None,
        }
    }
}

/// A half-open generation window `[start, end)` produced by the segmenter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether this window overlaps another (half-open semantics)
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A single scalar measurement at a point in time within a record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample timestamp (UTC)
    pub time: DateTime<Utc>,
    /// Measured value (BPM, RMSSD ms, or temperature-delta °C by kind)
    pub value: f64,
}

/// A storable record: an ordered run of samples plus framing metadata.
///
/// Created in memory by the assembler, handed to the insert driver, then
/// discarded. The external store is authoritative; nothing is persisted
/// locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub kind: MetricKind,
    /// Record start time (UTC)
    pub start_time: DateTime<Utc>,
    /// Record end time (UTC); always >= start_time
    pub end_time: DateTime<Utc>,
    /// UTC offset of the local zone at start_time, in seconds
    pub start_zone_offset_secs: i32,
    /// UTC offset of the local zone at end_time, in seconds
    pub end_zone_offset_secs: i32,
    /// Samples ordered by timestamp, all within [start_time, end_time]
    pub samples: Vec<Sample>,
    /// Synthetic client record id (prefix + start epoch seconds + counter)
    pub client_record_id: String,
}

/// Access direction for a data-type permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Read,
    Write,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
        }
    }
}

/// A data-access permission token understood by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub access: Access,
    pub kind: MetricKind,
}

impl Permission {
    pub fn read(kind: MetricKind) -> Self {
        Self {
            access: Access::Read,
            kind,
        }
    }

    pub fn write(kind: MetricKind) -> Self {
        Self {
            access: Access::Write,
            kind,
        }
    }

    /// Stable string form, e.g. `write:heart_rate`
    pub fn token(&self) -> String {
        format!("{}:{}", self.access.as_str(), self.kind.as_str())
    }
}
