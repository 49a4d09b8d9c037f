//! Synheart Seed - On-device synthetic biosignal seeding engine
//!
//! Seed generates plausible physiological time series (heart rate, HRV-RMSSD,
//! skin-temperature deltas) and persists them to an abstract health-data
//! store through a deterministic pipeline: interval segmentation -> phase
//! classification -> bounded random-walk sampling -> record assembly ->
//! chunked insert.
//!
//! ## Modules
//!
//! - **Historical backfill**: seed multi-day, phase-aware series over a
//!   caller-supplied or configured window
//! - **Live seeding**: a cancellable background loop inserting single-sample
//!   heart rate records on a randomized cadence
//! - **Store access**: permission checks and grouped range reads behind the
//!   [`store::HealthStore`] trait

pub mod assemble;
pub mod config;
pub mod controller;
pub mod driver;
pub mod error;
pub mod generator;
pub mod live;
pub mod phase;
pub mod pipeline;
pub mod request;
pub mod segment;
pub mod store;
pub mod types;

pub use config::SeedConfig;
pub use controller::{RunOutcome, SeedController};
pub use error::SeedError;
pub use live::LiveReport;
pub use pipeline::{generate_history, SeedEngine, SeedReport};
pub use request::RangeRequest;
pub use store::{HealthStore, JsonFileStore, MemoryStore, StoreError};
pub use types::{Access, MetricKind, Permission, Sample, SeedRecord, TimeWindow};

/// Seed version embedded in run reports and the CLI
pub const SEED_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for logging and provenance
pub const PRODUCER_NAME: &str = "synheart-seed";
