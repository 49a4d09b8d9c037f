//! Caller-facing request surface
//!
//! Mirrors the argument maps an application layer sends across a platform
//! channel: RFC 3339 start/end strings plus metric-kind tokens. Everything is
//! validated here, before any generation or store work begins, with a
//! descriptive reason per offending field. Responses serialize records into
//! plain JSON maps grouped by kind token.

use crate::error::SeedError;
use crate::types::{MetricKind, SeedRecord, TimeWindow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Raw time-range request as supplied by the application layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeRequest {
    /// RFC 3339 start timestamp
    pub start: String,
    /// RFC 3339 end timestamp
    pub end: String,
    /// Metric kind tokens (`heart_rate`, `heart_rate_variability`,
    /// `skin_temperature`)
    pub kinds: Vec<String>,
}

impl RangeRequest {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        kinds: Vec<String>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            kinds,
        }
    }

    /// Validate every field and produce the typed request. Fails on the
    /// first offending field with its reason; no work has happened by then.
    pub fn validate(&self) -> Result<ValidatedRequest, SeedError> {
        let start = parse_instant("start", &self.start)?;
        let end = parse_instant("end", &self.end)?;

        if start > end {
            return Err(SeedError::malformed(
                "start",
                format!("start {} is after end {}", self.start, self.end),
            ));
        }

        if self.kinds.is_empty() {
            return Err(SeedError::malformed(
                "kinds",
                "at least one metric kind is required",
            ));
        }

        let mut kinds = Vec::new();
        for token in &self.kinds {
            let kind = MetricKind::from_token(token).ok_or_else(|| {
                SeedError::malformed("kinds", format!("unknown metric kind '{token}'"))
            })?;
            // Duplicates collapse; order of first appearance is kept
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        Ok(ValidatedRequest {
            window: TimeWindow::new(start, end),
            kinds,
        })
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub window: TimeWindow,
    pub kinds: Vec<MetricKind>,
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, SeedError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            SeedError::malformed(
                field,
                format!("'{value}' is not a valid RFC 3339 timestamp: {e}"),
            )
        })
}

/// Serialize one record into the flat map shape the application layer
/// consumes.
pub fn record_to_map(record: &SeedRecord) -> Value {
    json!({
        "kind": record.kind.as_str(),
        "start_time_epoch_ms": record.start_time.timestamp_millis(),
        "end_time_epoch_ms": record.end_time.timestamp_millis(),
        "start_zone_offset_secs": record.start_zone_offset_secs,
        "end_zone_offset_secs": record.end_zone_offset_secs,
        "client_record_id": record.client_record_id,
        "samples": record
            .samples
            .iter()
            .map(|s| json!({ "time": s.time.to_rfc3339(), "value": s.value }))
            .collect::<Vec<Value>>(),
    })
}

/// Serialize a grouped read result: kind token -> list of record maps.
pub fn records_response(grouped: &BTreeMap<MetricKind, Vec<SeedRecord>>) -> Value {
    let mut out = serde_json::Map::new();
    for (kind, records) in grouped {
        out.insert(
            kind.as_str().to_string(),
            Value::Array(records.iter().map(record_to_map).collect()),
        );
    }
    Value::Object(out)
}
