//! Generation configuration
//!
//! All generation constants live in one explicit parameter struct instead of
//! scattered compile-time constants. `SeedConfig::default()` mirrors the
//! cadence of a consumer wearable: one week of history, 15-minute records,
//! one-minute samples. `validate()` rejects degenerate configurations before
//! any generation work starts.

use crate::error::SeedError;
use chrono::Duration;

/// Baseline, jitter, and inclusive clipping bounds for one phase of a metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseBand {
    pub baseline: f64,
    /// Half-width of the uniform jitter interval; a draw lies in [-j, +j]
    pub jitter: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-metric generation profile for phase-aware series (BPM, RMSSD)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricProfile {
    pub sleep: PhaseBand,
    pub awake: PhaseBand,
    /// Offset applied to the last sleep value at the start of the
    /// wake-stabilization blend (negative for metrics that drop on waking)
    pub wake_boost: f64,
    /// Amplitude of the sinusoidal term over the steady awake window
    pub osc_amplitude: f64,
}

/// Skin-temperature delta profile (no phase split)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempProfile {
    /// Base delta above the sensor baseline, °C
    pub base_delta: f64,
    /// Added per minute-of-hour of the local sample time, °C
    pub slope_per_minute: f64,
}

/// Sleep/wake phase boundaries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseConfig {
    /// Local hour of day at which the wake transition begins
    pub wake_hour: u32,
    /// Length of the wake-stabilization blend window
    pub stabilization: Duration,
}

/// Parameters for the continuous live heart-rate walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveProfile {
    /// Resting band the walk wanders within
    pub band_min: f64,
    pub band_max: f64,
    /// How far a wander step may leave the band before clamping
    pub band_slack: f64,
    /// Per-tick wander step half-width
    pub wander_step: f64,
    /// Chance per tick of an activity spike, once the cooldown has passed
    pub spike_chance: f64,
    pub spike_cooldown: Duration,
    /// Spike adds boost + uniform(0, boost/2)
    pub spike_boost: f64,
    /// BPM shed per tick while above the band
    pub recovery_step: f64,
    /// Absolute physiological clamp
    pub floor: f64,
    pub ceiling: f64,
    /// Randomized inter-sample delay bounds
    pub min_delay: Duration,
    pub max_delay: Duration,
}

/// Immutable configuration for a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    /// Length of history seeded when the caller gives no explicit window
    pub generation_period: Duration,
    /// Span of each assembled record
    pub record_span: Duration,
    /// Spacing between samples within a record
    pub sample_interval: Duration,
    /// Records per insert chunk
    pub chunk_size: usize,
    pub phase: PhaseConfig,
    pub heart_rate: MetricProfile,
    pub heart_rate_variability: MetricProfile,
    pub skin_temperature: TempProfile,
    pub live: LiveProfile,
    /// Fixed RNG seed for reproducible runs; `None` draws from entropy
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            generation_period: Duration::days(7),
            record_span: Duration::minutes(15),
            sample_interval: Duration::minutes(1),
            chunk_size: 100,
            phase: PhaseConfig {
                wake_hour: 6,
                stabilization: Duration::minutes(15),
            },
            heart_rate: MetricProfile {
                sleep: PhaseBand {
                    baseline: 56.0,
                    jitter: 4.0,
                    min: 48.0,
                    max: 64.0,
                },
                awake: PhaseBand {
                    baseline: 74.0,
                    jitter: 5.0,
                    min: 58.0,
                    max: 96.0,
                },
                wake_boost: 9.0,
                osc_amplitude: 6.0,
            },
            heart_rate_variability: MetricProfile {
                sleep: PhaseBand {
                    baseline: 68.0,
                    jitter: 12.0,
                    min: 22.0,
                    max: 120.0,
                },
                awake: PhaseBand {
                    baseline: 46.0,
                    jitter: 8.0,
                    min: 18.0,
                    max: 90.0,
                },
                // RMSSD drops on waking
                wake_boost: -6.0,
                osc_amplitude: 5.0,
            },
            skin_temperature: TempProfile {
                base_delta: 0.3,
                slope_per_minute: 0.005,
            },
            live: LiveProfile {
                band_min: 60.0,
                band_max: 85.0,
                band_slack: 3.0,
                wander_step: 1.5,
                spike_chance: 0.03,
                spike_cooldown: Duration::minutes(4),
                spike_boost: 25.0,
                recovery_step: 0.15,
                floor: 45.0,
                ceiling: 190.0,
                min_delay: Duration::seconds(15),
                max_delay: Duration::seconds(30),
            },
            rng_seed: None,
        }
    }
}

impl SeedConfig {
    /// Validate the configuration. Called by the engine before any
    /// generation work; a failure here means nothing was generated or
    /// inserted.
    pub fn validate(&self) -> Result<(), SeedError> {
        if self.generation_period <= Duration::zero() {
            return Err(SeedError::InvalidConfig(
                "generation_period must be positive".to_string(),
            ));
        }
        if self.record_span <= Duration::zero() {
            return Err(SeedError::InvalidConfig(
                "record_span must be positive".to_string(),
            ));
        }
        if self.sample_interval <= Duration::zero() {
            return Err(SeedError::InvalidConfig(
                "sample_interval must be positive".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(SeedError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.phase.wake_hour >= 24 {
            return Err(SeedError::InvalidConfig(format!(
                "wake_hour must be below 24, got {}",
                self.phase.wake_hour
            )));
        }
        if self.phase.stabilization <= Duration::zero() {
            return Err(SeedError::InvalidConfig(
                "stabilization must be positive".to_string(),
            ));
        }
        let day_secs = i64::from(self.phase.wake_hour) * 3600
            + self.phase.stabilization.num_seconds();
        if day_secs >= 86_400 {
            return Err(SeedError::InvalidConfig(
                "wake_hour plus stabilization must end before midnight".to_string(),
            ));
        }

        validate_profile("heart_rate", &self.heart_rate)?;
        validate_profile("heart_rate_variability", &self.heart_rate_variability)?;
        validate_live(&self.live)?;
        Ok(())
    }
}

fn validate_band(label: &str, band: &PhaseBand) -> Result<(), SeedError> {
    if band.min > band.max {
        return Err(SeedError::InvalidConfig(format!(
            "{label}: min {} exceeds max {}",
            band.min, band.max
        )));
    }
    if band.jitter < 0.0 {
        return Err(SeedError::InvalidConfig(format!(
            "{label}: jitter must be non-negative"
        )));
    }
    if band.baseline < band.min || band.baseline > band.max {
        return Err(SeedError::InvalidConfig(format!(
            "{label}: baseline {} outside [{}, {}]",
            band.baseline, band.min, band.max
        )));
    }
    Ok(())
}

fn validate_profile(metric: &str, profile: &MetricProfile) -> Result<(), SeedError> {
    validate_band(&format!("{metric}.sleep"), &profile.sleep)?;
    validate_band(&format!("{metric}.awake"), &profile.awake)?;
    Ok(())
}

fn validate_live(live: &LiveProfile) -> Result<(), SeedError> {
    if live.band_min >= live.band_max {
        return Err(SeedError::InvalidConfig(
            "live: band_min must be below band_max".to_string(),
        ));
    }
    if live.floor > live.ceiling {
        return Err(SeedError::InvalidConfig(
            "live: floor exceeds ceiling".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&live.spike_chance) {
        return Err(SeedError::InvalidConfig(format!(
            "live: spike_chance {} outside [0, 1]",
            live.spike_chance
        )));
    }
    if live.spike_boost <= 0.0 {
        return Err(SeedError::InvalidConfig(
            "live: spike_boost must be positive".to_string(),
        ));
    }
    if live.min_delay <= Duration::zero() || live.max_delay < live.min_delay {
        return Err(SeedError::InvalidConfig(
            "live: delay bounds must be positive with min <= max".to_string(),
        ));
    }
    Ok(())
}
