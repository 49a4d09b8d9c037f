//! Pipeline orchestration
//!
//! This module provides the public API for Synheart Seed. It wires the
//! segmenter, phase classifier, sample generator, and assembler into a
//! generation pass, and drives the chunked insert against a store.
//!
//! Pipeline stages:
//! 1. Segmenter - split the overall window into record windows
//! 2. Phase classifier + generator - one value per sample tick
//! 3. Assembler - wrap samples into storable records
//! 4. Chunked insert driver - persist to the external store

use crate::assemble::RecordAssembler;
use crate::config::SeedConfig;
use crate::driver::{insert_chunked, InsertSummary};
use crate::error::SeedError;
use crate::generator::{next_sample, temperature_delta, GeneratorState};
use crate::phase::classify;
use crate::request::{RangeRequest, ValidatedRequest};
use crate::segment::{sample_ticks, windows};
use crate::store::HealthStore;
use crate::types::{Access, MetricKind, Permission, Sample, SeedRecord, TimeWindow};
use chrono::{Local, TimeZone, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// Generate the historical record sequence for one metric kind over one
/// window. Pure CPU work; the store is not involved.
pub fn generate_history<Tz: TimeZone, R: Rng>(
    kind: MetricKind,
    window: &TimeWindow,
    config: &SeedConfig,
    zone: &Tz,
    rng: &mut R,
) -> Vec<SeedRecord> {
    let mut assembler = RecordAssembler::new(kind);
    let mut records = Vec::new();

    let profile = match kind {
        MetricKind::HeartRate => Some(&config.heart_rate),
        MetricKind::HeartRateVariability => Some(&config.heart_rate_variability),
        MetricKind::SkinTemperature => None,
    };
    let mut state = profile.map(GeneratorState::new);

    for record_window in windows(
        window.start,
        window.end,
        config.record_span,
        config.sample_interval,
    ) {
        let mut samples = Vec::new();
        for tick in sample_ticks(&record_window, config.sample_interval) {
            let local = zone.from_utc_datetime(&tick.naive_utc());
            let value = match (profile, state.as_mut()) {
                (Some(profile), Some(state)) => {
                    let phase = classify(local.time(), &config.phase);
                    next_sample(profile, phase, state, rng)
                }
                _ => temperature_delta(&config.skin_temperature, local.minute()),
            };
            samples.push(Sample { time: tick, value });
        }

        if let Some(record) = assembler.assemble(zone, &record_window, samples) {
            records.push(record);
        }
    }

    debug!(
        kind = kind.as_str(),
        records = records.len(),
        "generated historical records"
    );
    records
}

/// Outcome of one seeding run
#[derive(Debug, Clone)]
pub struct SeedReport {
    /// Unique id for this run
    pub run_id: String,
    /// Records generated per kind (all kinds requested, even if zero)
    pub records_generated: BTreeMap<MetricKind, usize>,
    pub records_committed: usize,
    pub chunks_committed: usize,
    /// True when the run was cancelled before all chunks were submitted
    pub cancelled: bool,
}

/// Seeding engine bound to one store and one configuration.
///
/// Generic over the zone used to resolve local time (phase boundaries,
/// minute-of-hour, record zone offsets); production callers use `Local`,
/// tests pin `Utc` or a fixed offset.
pub struct SeedEngine<S, Tz = Local> {
    store: Arc<S>,
    config: SeedConfig,
    zone: Tz,
}

impl<S: HealthStore> SeedEngine<S, Local> {
    /// Engine resolving local time from the system zone rule set
    pub fn new(store: Arc<S>, config: SeedConfig) -> Result<Self, SeedError> {
        Self::with_zone(store, config, Local)
    }
}

impl<S: HealthStore, Tz: TimeZone> SeedEngine<S, Tz> {
    pub fn with_zone(store: Arc<S>, config: SeedConfig, zone: Tz) -> Result<Self, SeedError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            zone,
        })
    }

    pub fn config(&self) -> &SeedConfig {
        &self.config
    }

    /// Whether every requested kind has the given access granted
    pub async fn has_permissions(
        &self,
        kinds: &[MetricKind],
        access: Access,
    ) -> Result<bool, SeedError> {
        let required = permissions_for(kinds, access);
        let granted = self.store.granted_permissions().await?;
        Ok(required.is_subset(&granted))
    }

    /// Request authorization for the given kinds; true when everything
    /// requested was granted.
    pub async fn request_permissions(
        &self,
        kinds: &[MetricKind],
        access: Access,
    ) -> Result<bool, SeedError> {
        let required = permissions_for(kinds, access);
        let requested: Vec<Permission> = required.iter().copied().collect();
        let granted = self.store.request_authorization(&requested).await?;
        Ok(required.is_subset(&granted))
    }

    /// Validate a caller request, generate for every requested kind, and
    /// chunk-insert into the store.
    pub async fn seed_history(
        &self,
        request: &RangeRequest,
        cancel: &CancellationToken,
    ) -> Result<SeedReport, SeedError> {
        let validated = request.validate()?;
        self.seed_validated(&validated, cancel).await
    }

    /// Seed the trailing `generation_period` ending now, as a demo backfill
    /// would.
    pub async fn seed_recent(
        &self,
        kinds: &[MetricKind],
        cancel: &CancellationToken,
    ) -> Result<SeedReport, SeedError> {
        let end = Utc::now();
        let validated = ValidatedRequest {
            window: TimeWindow::new(end - self.config.generation_period, end),
            kinds: dedupe(kinds),
        };
        self.seed_validated(&validated, cancel).await
    }

    async fn seed_validated(
        &self,
        validated: &ValidatedRequest,
        cancel: &CancellationToken,
    ) -> Result<SeedReport, SeedError> {
        let run_id = Uuid::new_v4().to_string();
        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut records_generated = BTreeMap::new();
        let mut all_records = Vec::new();
        for kind in &validated.kinds {
            let records =
                generate_history(*kind, &validated.window, &self.config, &self.zone, &mut rng);
            records_generated.insert(*kind, records.len());
            all_records.extend(records);
        }

        let summary: InsertSummary = insert_chunked(
            self.store.as_ref(),
            &all_records,
            self.config.chunk_size,
            cancel,
        )
        .await?;

        info!(
            run_id = %run_id,
            records = summary.records_committed,
            chunks = summary.chunks_committed,
            cancelled = summary.cancelled,
            "seeding run finished"
        );

        Ok(SeedReport {
            run_id,
            records_generated,
            records_committed: summary.records_committed,
            chunks_committed: summary.chunks_committed,
            cancelled: summary.cancelled,
        })
    }

    /// Run the continuous live seeding loop against this engine's store
    /// until the token is cancelled.
    pub async fn live_seed(&self, cancel: &CancellationToken) -> crate::live::LiveReport {
        crate::live::live_seed_loop(self.store.as_ref(), &self.config, &self.zone, cancel)
            .await
    }

    /// Read records of every requested kind over the validated range,
    /// grouped by kind.
    pub async fn read_records(
        &self,
        request: &RangeRequest,
    ) -> Result<BTreeMap<MetricKind, Vec<SeedRecord>>, SeedError> {
        let validated = request.validate()?;

        let mut grouped = BTreeMap::new();
        for kind in &validated.kinds {
            let records = self
                .store
                .read_records(*kind, &validated.window)
                .await?;
            debug!(kind = kind.as_str(), records = records.len(), "read records");
            grouped.insert(*kind, records);
        }
        Ok(grouped)
    }
}

fn permissions_for(kinds: &[MetricKind], access: Access) -> HashSet<Permission> {
    kinds
        .iter()
        .map(|kind| Permission {
            access,
            kind: *kind,
        })
        .collect()
}

fn dedupe(kinds: &[MetricKind]) -> Vec<MetricKind> {
    let mut out = Vec::new();
    for kind in kinds {
        if !out.contains(kind) {
            out.push(*kind);
        }
    }
    out
}
