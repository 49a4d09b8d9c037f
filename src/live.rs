//! Continuous live seeding loop
//!
//! Mimics a third-party wearable origin by inserting one single-sample heart
//! rate record at a time, on a randomized 15-30 second cadence, until
//! cancelled. Each record spans from just after the previous record's end to
//! now, so consecutive records never overlap. Cancellation is observed at
//! tick boundaries only; a record is either fully inserted or never built.

use crate::assemble::RecordAssembler;
use crate::config::SeedConfig;
use crate::generator::LiveWalk;
use crate::store::HealthStore;
use crate::types::{MetricKind, Sample, TimeWindow};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Outcome of a live seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveReport {
    pub records_seeded: usize,
    /// Store rejections; each is logged and the loop keeps running
    pub insert_failures: usize,
}

/// Run the live seeding loop until the token is cancelled.
pub async fn live_seed_loop<S, Tz>(
    store: &S,
    config: &SeedConfig,
    zone: &Tz,
    cancel: &CancellationToken,
) -> LiveReport
where
    S: HealthStore + ?Sized,
    Tz: TimeZone,
{
    let live = &config.live;
    let mut rng = StdRng::from_entropy();
    let started = Utc::now();
    let mut walk = LiveWalk::new(live, started);
    let mut assembler = RecordAssembler::new(MetricKind::HeartRate);
    let mut last_end: DateTime<Utc> = started - Duration::seconds(10);
    let mut report = LiveReport::default();

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let now = Utc::now();
        // Let at least a second of wall time accumulate per record
        if now < last_end + Duration::seconds(1) {
            if wait(std::time::Duration::from_millis(200), cancel).await {
                break;
            }
            continue;
        }

        let start = last_end + Duration::milliseconds(1);
        let end = now;
        if start >= end {
            warn!(%start, %end, "skipping tick with invalid sample bounds");
            last_end = end;
            continue;
        }

        let bpm = walk.next_bpm(now, live, &mut rng);
        let window = TimeWindow::new(start, end);
        let samples = vec![Sample {
            time: start,
            value: bpm,
        }];

        if let Some(record) = assembler.assemble(zone, &window, samples) {
            match store.insert_records(std::slice::from_ref(&record)).await {
                Ok(()) => {
                    report.records_seeded += 1;
                    info!(bpm, "seeded live heart rate sample");
                }
                Err(e) => {
                    report.insert_failures += 1;
                    warn!(error = %e, "live insert rejected, continuing");
                }
            }
        }
        last_end = end;

        let delay_ms = rng
            .gen_range(live.min_delay.num_milliseconds()..=live.max_delay.num_milliseconds());
        if wait(std::time::Duration::from_millis(delay_ms as u64), cancel).await {
            break;
        }
    }

    info!(
        records = report.records_seeded,
        failures = report.insert_failures,
        "live seeding loop shut down"
    );
    report
}

/// Sleep for `duration` unless cancelled first; true means cancelled.
async fn wait(duration: std::time::Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = cancel.cancelled() => true,
    }
}
