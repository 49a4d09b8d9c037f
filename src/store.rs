//! Health-data store abstraction
//!
//! The seeding pipeline depends only on this trait, never on a concrete host
//! SDK. Platform backends (Health Connect, HealthKit) sit behind it on the
//! native side; this crate ships an in-memory store for tests and demos and
//! an NDJSON file store so the CLI works end to end.

use crate::types::{MetricKind, Permission, SeedRecord, TimeWindow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

/// Errors reported by a store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store rejected the request: {0}")]
    Rejected(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Store I/O error: {0}")]
    Io(String),
}

/// Abstract health-data store.
///
/// `insert_records` must be all-or-nothing per call: a rejected call commits
/// none of the records it was given. The chunked driver relies on this to
/// report an exact committed count.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Insert a batch of records.
    async fn insert_records(&self, records: &[SeedRecord]) -> Result<(), StoreError>;

    /// Permissions currently granted to this client.
    async fn granted_permissions(&self) -> Result<HashSet<Permission>, StoreError>;

    /// Ask the user/platform to grant the given permissions; returns the set
    /// actually granted (which may be a subset).
    async fn request_authorization(
        &self,
        requested: &[Permission],
    ) -> Result<HashSet<Permission>, StoreError>;

    /// Read records of one kind whose span overlaps the window, ordered by
    /// start time.
    async fn read_records(
        &self,
        kind: MetricKind,
        window: &TimeWindow,
    ) -> Result<Vec<SeedRecord>, StoreError>;
}

/// In-process store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SeedRecord>>,
    granted: Mutex<HashSet<Permission>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with read and write permission for every kind already granted.
    pub fn with_all_permissions() -> Self {
        let store = Self::new();
        {
            let mut granted = store.granted.lock().unwrap();
            for kind in MetricKind::ALL {
                granted.insert(Permission::read(kind));
                granted.insert(Permission::write(kind));
            }
        }
        store
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl HealthStore for MemoryStore {
    async fn insert_records(&self, records: &[SeedRecord]) -> Result<(), StoreError> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn granted_permissions(&self) -> Result<HashSet<Permission>, StoreError> {
        Ok(self.granted.lock().unwrap().clone())
    }

    async fn request_authorization(
        &self,
        requested: &[Permission],
    ) -> Result<HashSet<Permission>, StoreError> {
        let mut granted = self.granted.lock().unwrap();
        for permission in requested {
            granted.insert(*permission);
        }
        Ok(granted.clone())
    }

    async fn read_records(
        &self,
        kind: MetricKind,
        window: &TimeWindow,
    ) -> Result<Vec<SeedRecord>, StoreError> {
        let records = self.records.lock().unwrap();
        let mut matched: Vec<SeedRecord> = records
            .iter()
            .filter(|r| r.kind == kind && overlaps(r, window))
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.start_time);
        Ok(matched)
    }
}

/// NDJSON-file-backed store: one serialized record per line, appended on
/// insert. A local file has no permission broker, so every permission is
/// considered granted.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<SeedRecord>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };

        let mut records = Vec::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record: SeedRecord = serde_json::from_str(line)
                .map_err(|e| StoreError::Io(format!("corrupt record line: {e}")))?;
            records.push(record);
        }
        Ok(records)
    }
}

fn all_permissions() -> HashSet<Permission> {
    MetricKind::ALL
        .into_iter()
        .flat_map(|kind| [Permission::read(kind), Permission::write(kind)])
        .collect()
}

fn overlaps(record: &SeedRecord, window: &TimeWindow) -> bool {
    record.start_time < window.end && window.start <= record.end_time
}

#[async_trait]
impl HealthStore for JsonFileStore {
    async fn insert_records(&self, records: &[SeedRecord]) -> Result<(), StoreError> {
        let mut lines = String::new();
        for record in records {
            let json = serde_json::to_string(record)
                .map_err(|e| StoreError::Io(e.to_string()))?;
            lines.push_str(&json);
            lines.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.write_all(lines.as_bytes())
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        file.flush().await.map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    async fn granted_permissions(&self) -> Result<HashSet<Permission>, StoreError> {
        Ok(all_permissions())
    }

    async fn request_authorization(
        &self,
        _requested: &[Permission],
    ) -> Result<HashSet<Permission>, StoreError> {
        Ok(all_permissions())
    }

    async fn read_records(
        &self,
        kind: MetricKind,
        window: &TimeWindow,
    ) -> Result<Vec<SeedRecord>, StoreError> {
        let mut matched: Vec<SeedRecord> = self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.kind == kind && overlaps(r, window))
            .collect();
        matched.sort_by_key(|r| r.start_time);
        Ok(matched)
    }
}
