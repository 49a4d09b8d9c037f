//! Record assembly
//!
//! Wraps a generated sample sequence and its window into a storable record:
//! start/end instants, per-instant zone offsets (resolved from the zone's
//! rule set, so DST transitions get the offset in force at each endpoint),
//! and a synthetic client record id.
//!
//! Ids are `<prefix><start epoch seconds>_<n>` with a per-assembler monotonic
//! counter, so sub-second-spaced windows can never collide within a run.

use crate::types::{MetricKind, Sample, SeedRecord, TimeWindow};
use chrono::{DateTime, Offset, TimeZone, Utc};

/// Client id prefixes, one per metric kind
pub const HR_ID_PREFIX: &str = "SEEDER_HR_";
pub const HRV_ID_PREFIX: &str = "SEEDER_HRV_";
pub const SKIN_TEMP_ID_PREFIX: &str = "SEEDER_SKINTEMP_";

/// Assembles samples into records for one metric kind
#[derive(Debug)]
pub struct RecordAssembler {
    kind: MetricKind,
    counter: u64,
}

impl RecordAssembler {
    pub fn new(kind: MetricKind) -> Self {
        Self { kind, counter: 0 }
    }

    /// Package one window's samples into a record. Empty samples produce no
    /// record (the window was all skipped ticks), and the counter does not
    /// advance.
    pub fn assemble<Tz: TimeZone>(
        &mut self,
        zone: &Tz,
        window: &TimeWindow,
        samples: Vec<Sample>,
    ) -> Option<SeedRecord> {
        if samples.is_empty() {
            return None;
        }

        let id = format!(
            "{}{}_{}",
            id_prefix(self.kind),
            window.start.timestamp(),
            self.counter
        );
        self.counter += 1;

        Some(SeedRecord {
            kind: self.kind,
            start_time: window.start,
            end_time: window.end,
            start_zone_offset_secs: zone_offset_secs(zone, window.start),
            end_zone_offset_secs: zone_offset_secs(zone, window.end),
            samples,
            client_record_id: id,
        })
    }
}

fn id_prefix(kind: MetricKind) -> &'static str {
    match kind {
        MetricKind::HeartRate => HR_ID_PREFIX,
        MetricKind::HeartRateVariability => HRV_ID_PREFIX,
        MetricKind::SkinTemperature => SKIN_TEMP_ID_PREFIX,
    }
}

/// UTC offset of `zone` at the given instant, in seconds
pub(crate) fn zone_offset_secs<Tz: TimeZone>(zone: &Tz, at: DateTime<Utc>) -> i32 {
    zone.offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use pretty_assertions::assert_eq;

    fn window() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        TimeWindow::new(start, start + Duration::minutes(15))
    }

    fn samples(window: &TimeWindow) -> Vec<Sample> {
        vec![
            Sample {
                time: window.start,
                value: 62.0,
            },
            Sample {
                time: window.start + Duration::minutes(1),
                value: 63.0,
            },
        ]
    }

    #[test]
    fn test_empty_samples_produce_no_record() {
        let mut assembler = RecordAssembler::new(MetricKind::HeartRate);
        assert!(assembler.assemble(&Utc, &window(), Vec::new()).is_none());
    }

    #[test]
    fn test_record_carries_window_and_samples() {
        let mut assembler = RecordAssembler::new(MetricKind::HeartRate);
        let window = window();
        let record = assembler
            .assemble(&Utc, &window, samples(&window))
            .unwrap();

        assert_eq!(record.kind, MetricKind::HeartRate);
        assert_eq!(record.start_time, window.start);
        assert_eq!(record.end_time, window.end);
        assert!(record.end_time >= record.start_time);
        assert_eq!(record.samples.len(), 2);
        for sample in &record.samples {
            assert!(sample.time >= record.start_time && sample.time <= record.end_time);
        }
    }

    #[test]
    fn test_client_ids_are_unique_even_for_identical_windows() {
        let mut assembler = RecordAssembler::new(MetricKind::HeartRateVariability);
        let window = window();

        let first = assembler
            .assemble(&Utc, &window, samples(&window))
            .unwrap();
        let second = assembler
            .assemble(&Utc, &window, samples(&window))
            .unwrap();

        let epoch = window.start.timestamp();
        assert_eq!(first.client_record_id, format!("{HRV_ID_PREFIX}{epoch}_0"));
        assert_eq!(second.client_record_id, format!("{HRV_ID_PREFIX}{epoch}_1"));
    }

    #[test]
    fn test_skipped_windows_do_not_advance_the_counter() {
        let mut assembler = RecordAssembler::new(MetricKind::SkinTemperature);
        let window = window();

        assert!(assembler.assemble(&Utc, &window, Vec::new()).is_none());
        let record = assembler
            .assemble(&Utc, &window, samples(&window))
            .unwrap();
        assert!(record.client_record_id.ends_with("_0"));
        assert!(record.client_record_id.starts_with(SKIN_TEMP_ID_PREFIX));
    }

    #[test]
    fn test_zone_offsets_resolved_per_instant() {
        let zone = FixedOffset::east_opt(3600).unwrap();
        let mut assembler = RecordAssembler::new(MetricKind::HeartRate);
        let window = window();
        let record = assembler
            .assemble(&zone, &window, samples(&window))
            .unwrap();

        assert_eq!(record.start_zone_offset_secs, 3600);
        assert_eq!(record.end_zone_offset_secs, 3600);
    }
}
