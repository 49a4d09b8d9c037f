//! Synthetic sample generation
//!
//! Two generators live here. The historical generator produces one value per
//! sample tick from a phase baseline, a deterministic oscillation term, and a
//! bounded uniform jitter, clipped to the configured band. The live walk
//! reproduces a wrist-worn sensor's resting wander with occasional activity
//! spikes and a slow recovery back into the resting band.
//!
//! State carried across ticks is explicit: the historical generator threads a
//! `GeneratorState` holding the last sleep-phase value (the anchor of the
//! wake-stabilization blend), and the live walk owns its current BPM.

use crate::config::{LiveProfile, MetricProfile, TempProfile};
use crate::phase::Phase;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::f64::consts::TAU;

/// Explicit per-run generator state, threaded through the generation loop
#[derive(Debug, Clone, Copy)]
pub struct GeneratorState {
    last_sleep_value: f64,
}

impl GeneratorState {
    /// Start a run anchored at the sleep baseline, so a window that opens
    /// mid-stabilization still blends from a plausible value.
    pub fn new(profile: &MetricProfile) -> Self {
        Self {
            last_sleep_value: profile.sleep.baseline,
        }
    }

    pub fn last_sleep_value(&self) -> f64 {
        self.last_sleep_value
    }
}

/// Linear interpolation from `a` to `b` by `t`
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn jitter<R: Rng>(rng: &mut R, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        0.0
    } else {
        rng.gen_range(-half_width..=half_width)
    }
}

/// Produce the next phase-aware value for one sample tick.
///
/// Sleep draws are clipped to the sleep band and remembered in `state`.
/// The stabilization blend is left unclipped so it is exactly continuous at
/// both endpoints: proportion 0 yields `last_sleep_value + wake_boost`,
/// proportion 1 yields the awake baseline. Awake draws add one sine cycle
/// over the awake window plus jitter, clipped to the awake band.
pub fn next_sample<R: Rng>(
    profile: &MetricProfile,
    phase: Phase,
    state: &mut GeneratorState,
    rng: &mut R,
) -> f64 {
    match phase {
        Phase::Sleep => {
            let raw = profile.sleep.baseline + jitter(rng, profile.sleep.jitter);
            let value = raw.clamp(profile.sleep.min, profile.sleep.max);
            state.last_sleep_value = value;
            value
        }
        Phase::WakeStabilizing { proportion } => lerp(
            state.last_sleep_value + profile.wake_boost,
            profile.awake.baseline,
            proportion,
        ),
        Phase::Awake { proportion } => {
            let oscillation = profile.osc_amplitude * (TAU * proportion).sin();
            let raw =
                profile.awake.baseline + oscillation + jitter(rng, profile.awake.jitter);
            raw.clamp(profile.awake.min, profile.awake.max)
        }
    }
}

/// Skin-temperature delta for a sample at the given local minute of hour.
/// No phase split and no jitter; the sawtooth over each hour is enough for
/// a plausible demo series.
pub fn temperature_delta(profile: &TempProfile, minute_of_hour: u32) -> f64 {
    profile.base_delta + f64::from(minute_of_hour) * profile.slope_per_minute
}

/// Bounded random walk for the continuous live seeder.
#[derive(Debug, Clone, Copy)]
pub struct LiveWalk {
    bpm: f64,
    last_spike: DateTime<Utc>,
}

impl LiveWalk {
    pub fn new(profile: &LiveProfile, started_at: DateTime<Utc>) -> Self {
        Self {
            bpm: (profile.band_min + profile.band_max) / 2.0,
            last_spike: started_at,
        }
    }

    /// Advance one tick and return the next BPM value.
    ///
    /// Once the spike cooldown has elapsed, each tick has a small chance of
    /// an activity spike. Above the resting band the walk sheds a fixed
    /// recovery step per tick; re-entering the band re-randomizes within it.
    /// Inside the band it wanders by a bounded step, clamped to the band
    /// plus slack. The returned value is always inside the absolute clamp.
    pub fn next_bpm<R: Rng>(
        &mut self,
        now: DateTime<Utc>,
        profile: &LiveProfile,
        rng: &mut R,
    ) -> f64 {
        if now - self.last_spike > profile.spike_cooldown
            && rng.gen::<f64>() < profile.spike_chance
        {
            self.bpm += profile.spike_boost
                + rng.gen_range(0.0..profile.spike_boost / 2.0);
            self.last_spike = now;
        }

        if self.bpm > profile.band_max {
            self.bpm -= profile.recovery_step;
            if self.bpm < profile.band_max {
                self.bpm = rng.gen_range(profile.band_min..profile.band_max);
            }
        } else {
            self.bpm += jitter(rng, profile.wander_step);
            self.bpm = self.bpm.clamp(
                profile.band_min - profile.band_slack,
                profile.band_max + profile.band_slack,
            );
        }

        self.bpm.clamp(profile.floor, profile.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn profile() -> MetricProfile {
        SeedConfig::default().heart_rate
    }

    #[test]
    fn test_sleep_values_stay_within_bounds() {
        let profile = profile();
        let mut state = GeneratorState::new(&profile);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10_000 {
            let value = next_sample(&profile, Phase::Sleep, &mut state, &mut rng);
            assert!(value >= profile.sleep.min && value <= profile.sleep.max);
            assert_eq!(state.last_sleep_value(), value);
        }
    }

    #[test]
    fn test_awake_values_stay_within_bounds() {
        let profile = profile();
        let mut state = GeneratorState::new(&profile);
        let mut rng = StdRng::seed_from_u64(7);

        for i in 0..10_000 {
            let proportion = f64::from(i) / 10_000.0;
            let value =
                next_sample(&profile, Phase::Awake { proportion }, &mut state, &mut rng);
            assert!(value >= profile.awake.min && value <= profile.awake.max);
        }
    }

    #[test]
    fn test_stabilization_blend_is_continuous_at_boundaries() {
        let mut profile = profile();
        profile.sleep.jitter = 0.0;
        let mut state = GeneratorState::new(&profile);
        let mut rng = StdRng::seed_from_u64(7);

        // Pin last_sleep_value to the (jitter-free) sleep baseline
        let last = next_sample(&profile, Phase::Sleep, &mut state, &mut rng);
        assert_eq!(last, profile.sleep.baseline);

        let at_start = next_sample(
            &profile,
            Phase::WakeStabilizing { proportion: 0.0 },
            &mut state,
            &mut rng,
        );
        assert!((at_start - (last + profile.wake_boost)).abs() < 1e-9);

        let at_end = next_sample(
            &profile,
            Phase::WakeStabilizing { proportion: 1.0 },
            &mut state,
            &mut rng,
        );
        assert!((at_end - profile.awake.baseline).abs() < 1e-9);
    }

    #[test]
    fn test_stabilization_does_not_disturb_sleep_anchor() {
        let profile = profile();
        let mut state = GeneratorState::new(&profile);
        let mut rng = StdRng::seed_from_u64(7);

        let anchor = next_sample(&profile, Phase::Sleep, &mut state, &mut rng);
        next_sample(
            &profile,
            Phase::WakeStabilizing { proportion: 0.4 },
            &mut state,
            &mut rng,
        );
        assert_eq!(state.last_sleep_value(), anchor);
    }

    #[test]
    fn test_awake_oscillation_peaks_at_quarter_cycle() {
        let mut profile = profile();
        profile.awake.jitter = 0.0;
        let mut state = GeneratorState::new(&profile);
        let mut rng = StdRng::seed_from_u64(7);

        let peak = next_sample(
            &profile,
            Phase::Awake { proportion: 0.25 },
            &mut state,
            &mut rng,
        );
        assert!((peak - (profile.awake.baseline + profile.osc_amplitude)).abs() < 1e-9);
    }

    #[test]
    fn test_temperature_delta_follows_minute_slope() {
        let profile = TempProfile {
            base_delta: 0.3,
            slope_per_minute: 0.005,
        };
        assert!((temperature_delta(&profile, 0) - 0.3).abs() < 1e-12);
        assert!((temperature_delta(&profile, 30) - 0.45).abs() < 1e-12);
        assert!((temperature_delta(&profile, 59) - 0.595).abs() < 1e-12);
    }

    #[test]
    fn test_live_walk_respects_absolute_clamp() {
        let live = SeedConfig::default().live;
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let mut walk = LiveWalk::new(&live, start);
        let mut rng = StdRng::seed_from_u64(7);

        let mut now = start;
        for _ in 0..10_000 {
            now += Duration::seconds(20);
            let bpm = walk.next_bpm(now, &live, &mut rng);
            assert!(bpm >= live.floor && bpm <= live.ceiling);
        }
    }

    #[test]
    fn test_live_walk_spikes_then_recovers_into_band() {
        let mut live = SeedConfig::default().live;
        live.spike_chance = 1.0;
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let mut walk = LiveWalk::new(&live, start);
        let mut rng = StdRng::seed_from_u64(7);

        // Past the cooldown, the forced spike lands above the resting band
        let spiked_at = start + live.spike_cooldown + Duration::seconds(1);
        let spiked = walk.next_bpm(spiked_at, &live, &mut rng);
        assert!(spiked > live.band_max);

        // With spikes suppressed again, recovery steps walk it back down
        live.spike_chance = 0.0;
        let mut now = spiked_at;
        let mut bpm = spiked;
        for _ in 0..10_000 {
            now += Duration::seconds(20);
            bpm = walk.next_bpm(now, &live, &mut rng);
            if bpm <= live.band_max {
                break;
            }
        }
        assert!(bpm >= live.band_min && bpm <= live.band_max);
    }

    #[test]
    fn test_live_walk_honors_spike_cooldown() {
        let mut live = SeedConfig::default().live;
        live.spike_chance = 1.0;
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let mut walk = LiveWalk::new(&live, start);
        let mut rng = StdRng::seed_from_u64(7);

        // Inside the cooldown no spike can fire, so the walk stays within
        // the slack-extended resting band.
        let bpm = walk.next_bpm(start + Duration::seconds(30), &live, &mut rng);
        assert!(bpm <= live.band_max + live.band_slack);
    }
}
