//! Physiological phase classification
//!
//! Classifies a local time of day into the regime that drives sample
//! generation: asleep, stabilizing after waking, or steadily awake. Purely
//! config-driven; the caller resolves UTC instants to local time per instant
//! so DST transitions land in the right phase.

use crate::config::PhaseConfig;
use chrono::{NaiveTime, Timelike};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Phase of the day a sample falls into
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Sleep,
    /// Blending from the sleep baseline toward the awake baseline.
    /// `proportion` is the elapsed fraction of the stabilization window,
    /// 0 at the wake boundary itself.
    WakeStabilizing { proportion: f64 },
    /// Steady wake. `proportion` is the elapsed fraction of the
    /// post-stabilization awake window (through end of day).
    Awake { proportion: f64 },
}

/// Classify a local time of day against the configured sleep/wake boundary.
pub fn classify(time_of_day: NaiveTime, config: &PhaseConfig) -> Phase {
    let second = f64::from(time_of_day.num_seconds_from_midnight());
    let wake = f64::from(config.wake_hour) * 3600.0;
    let stabilization = config.stabilization.num_seconds() as f64;

    if second < wake {
        Phase::Sleep
    } else if second < wake + stabilization {
        Phase::WakeStabilizing {
            proportion: (second - wake) / stabilization,
        }
    } else {
        let awake_span = SECONDS_PER_DAY - (wake + stabilization);
        let proportion = if awake_span > 0.0 {
            (second - wake - stabilization) / awake_span
        } else {
            0.0
        };
        Phase::Awake { proportion }
    }
}
