//! Interval segmentation
//!
//! Splits an overall generation window into fixed-span record windows,
//! clipping the final window to the overall boundary and skipping windows
//! too short to hold a single sample. The iterator is a pure function of its
//! inputs: constructing it twice yields identical sequences.

use crate::types::TimeWindow;
use chrono::{DateTime, Duration, Utc};

/// Lazy iterator over non-overlapping record windows covering
/// `[overall_start, overall_end)`.
#[derive(Debug, Clone)]
pub struct WindowIter {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    record_span: Duration,
    sample_interval: Duration,
}

/// Segment `[overall_start, overall_end)` into windows of `record_span`.
///
/// Windows shorter than `sample_interval` (only possible at the clipped
/// tail) are dropped, not errors. Non-positive spans or intervals yield an
/// empty sequence rather than looping forever; `SeedConfig::validate`
/// rejects such configurations up front.
pub fn windows(
    overall_start: DateTime<Utc>,
    overall_end: DateTime<Utc>,
    record_span: Duration,
    sample_interval: Duration,
) -> WindowIter {
    let degenerate =
        record_span <= Duration::zero() || sample_interval <= Duration::zero();
    WindowIter {
        // A degenerate span would never advance the cursor; start exhausted.
        cursor: if degenerate { overall_end } else { overall_start },
        end: overall_end,
        record_span,
        sample_interval,
    }
}

impl Iterator for WindowIter {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        while self.cursor < self.end {
            let window_end = (self.cursor + self.record_span).min(self.end);
            let window = TimeWindow::new(self.cursor, window_end);
            self.cursor = window_end;

            if window.duration() >= self.sample_interval {
                return Some(window);
            }
            // Under-length remainder: skip and continue from the clipped
            // boundary (which here is already the overall end).
        }
        None
    }
}

/// Iterator over sample ticks within one window: `start + k * interval`
/// for `k = 0, 1, ...` while the tick precedes the window end.
#[derive(Debug, Clone)]
pub struct SampleTicks {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
    interval: Duration,
}

pub fn sample_ticks(window: &TimeWindow, interval: Duration) -> SampleTicks {
    SampleTicks {
        next: if interval > Duration::zero() {
            window.start
        } else {
            window.end
        },
        end: window.end,
        interval,
    }
}

impl Iterator for SampleTicks {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<DateTime<Utc>> {
        if self.next >= self.end {
            return None;
        }
        let tick = self.next;
        self.next = tick + self.interval;
        Some(tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, 0).unwrap()
    }

    #[test]
    fn test_even_split() {
        let result: Vec<TimeWindow> = windows(
            at(8, 0),
            at(10, 0),
            Duration::minutes(30),
            Duration::minutes(10),
        )
        .collect();

        assert_eq!(result.len(), 4);
        assert_eq!(result[0], TimeWindow::new(at(8, 0), at(8, 30)));
        assert_eq!(result[3], TimeWindow::new(at(9, 30), at(10, 0)));
    }

    #[test]
    fn test_windows_are_ordered_non_overlapping_and_covering() {
        let start = at(0, 0);
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 7, 17, 0).unwrap();
        let result: Vec<TimeWindow> =
            windows(start, end, Duration::minutes(15), Duration::minutes(1)).collect();

        for pair in result.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(!pair[0].overlaps(&pair[1]));
        }
        assert_eq!(result.first().unwrap().start, start);
        // Coverage up to the overall end minus at most one under-length tail
        let tail_gap = end - result.last().unwrap().end;
        assert!(tail_gap < Duration::minutes(1));
    }

    #[test]
    fn test_final_window_clipped_to_boundary() {
        let result: Vec<TimeWindow> = windows(
            at(8, 0),
            at(8, 50),
            Duration::minutes(30),
            Duration::minutes(10),
        )
        .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1], TimeWindow::new(at(8, 30), at(8, 50)));
    }

    #[test]
    fn test_under_length_remainder_dropped() {
        // 65-minute range, 30-minute span, 10-minute interval: the trailing
        // 5-minute window cannot hold a sample spacing and is skipped.
        let result: Vec<TimeWindow> = windows(
            at(8, 0),
            at(9, 5),
            Duration::minutes(30),
            Duration::minutes(10),
        )
        .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].end, at(9, 0));
    }

    #[test]
    fn test_window_exactly_one_interval_long_is_kept() {
        let result: Vec<TimeWindow> = windows(
            at(8, 0),
            at(8, 40),
            Duration::minutes(30),
            Duration::minutes(10),
        )
        .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1], TimeWindow::new(at(8, 30), at(8, 40)));
    }

    #[test]
    fn test_empty_when_start_not_before_end() {
        assert_eq!(
            windows(at(8, 0), at(8, 0), Duration::minutes(30), Duration::minutes(10))
                .count(),
            0
        );
        assert_eq!(
            windows(at(9, 0), at(8, 0), Duration::minutes(30), Duration::minutes(10))
                .count(),
            0
        );
    }

    #[test]
    fn test_degenerate_spans_terminate_with_no_windows() {
        assert_eq!(
            windows(at(8, 0), at(10, 0), Duration::zero(), Duration::minutes(1)).count(),
            0
        );
        assert_eq!(
            windows(at(8, 0), at(10, 0), Duration::minutes(15), Duration::zero()).count(),
            0
        );
    }

    #[test]
    fn test_segmentation_is_idempotent() {
        let a: Vec<TimeWindow> = windows(
            at(8, 0),
            at(13, 7),
            Duration::minutes(15),
            Duration::minutes(1),
        )
        .collect();
        let b: Vec<TimeWindow> = windows(
            at(8, 0),
            at(13, 7),
            Duration::minutes(15),
            Duration::minutes(1),
        )
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_ticks_exclusive_of_window_end() {
        let window = TimeWindow::new(at(8, 0), at(8, 30));
        let ticks: Vec<DateTime<Utc>> =
            sample_ticks(&window, Duration::minutes(10)).collect();

        assert_eq!(ticks, vec![at(8, 0), at(8, 10), at(8, 20)]);
    }

    #[test]
    fn test_sample_ticks_degenerate_interval_is_empty() {
        let window = TimeWindow::new(at(8, 0), at(8, 30));
        assert_eq!(sample_ticks(&window, Duration::zero()).count(), 0);
    }
}
