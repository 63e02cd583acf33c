//! Persistent job queue using redb.
//!
//! # Table design
//!
//! `JOBS` uses a 24-byte composite key:
//! ```text
//! [ run_at_ms: i64 with sign bit flipped, big-endian (8 bytes) | uuid: 16 bytes ]
//! ```
//!
//! Flipping the sign bit maps `i64` order onto unsigned byte order, and the
//! timestamp occupies the high bytes, so byte ordering equals run-time
//! ordering, including for run times before the epoch. A single range scan
//! `..=due_upper_bound(now)` returns every job due by `now`.
//!
//! `JOB_INDEX` maps `"<target>/<direction>"` to the job's current `JOBS` key.
//! It is the authority for "one job per target and direction": a reschedule
//! removes the old `JOBS` row, inserts the new one and repoints the index,
//! all inside one write transaction.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::error::{EmbargoError, Result};
use crate::types::Direction;

use super::job::{JobRef, ScheduledJob};
use super::queue::JobQueue;

// ---------------------------------------------------------------------------
// Table definitions
// ---------------------------------------------------------------------------

/// Key: 24-byte composite (ordered run_at_ms ++ uuid bytes)
/// Value: JSON-encoded ScheduledJob
const JOBS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("jobs");

/// Key: "<target>/<direction>"
/// Value: the job's 24-byte `JOBS` key
const JOB_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("job_index");

// ---------------------------------------------------------------------------
// Key helpers
// ---------------------------------------------------------------------------

fn ts_bytes(ts: DateTime<Utc>) -> [u8; 8] {
    ((ts.timestamp_millis() as u64) ^ (1 << 63)).to_be_bytes()
}

fn job_key(ts: DateTime<Utc>, id: Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&ts_bytes(ts));
    key[8..].copy_from_slice(id.as_bytes());
    key
}

/// Upper bound for a range scan returning all jobs due by `now`.
///
/// The UUID suffix is `0xff` × 16, which is greater than any valid UUID,
/// so all jobs with `run_at_ms <= now_ms` are included.
fn due_upper_bound(now: DateTime<Utc>) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&ts_bytes(now));
    key[8..].fill(0xff);
    key
}

fn index_key(target: &str, direction: Direction) -> String {
    format!("{target}/{direction}")
}

fn db_err(e: impl std::fmt::Display) -> EmbargoError {
    EmbargoError::JobQueue(e.to_string())
}

// ---------------------------------------------------------------------------
// JobDb
// ---------------------------------------------------------------------------

/// Persistent store for `ScheduledJob` records.
pub struct JobDb {
    db: Database,
}

impl JobDb {
    /// Open or create the redb database at `path`.
    ///
    /// Creates both tables if they don't already exist.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path).map_err(db_err)?;
        let wt = db.begin_write().map_err(db_err)?;
        wt.open_table(JOBS).map_err(db_err)?;
        wt.open_table(JOB_INDEX).map_err(db_err)?;
        wt.commit().map_err(db_err)?;
        Ok(Self { db })
    }

    fn scan(&self, upper: Option<[u8; 24]>) -> Result<Vec<ScheduledJob>> {
        let rt = self.db.begin_read().map_err(db_err)?;
        let table = rt.open_table(JOBS).map_err(db_err)?;

        let mut result = Vec::new();
        let rows = match upper {
            Some(upper) => table.range(..=upper.as_slice()).map_err(db_err)?,
            None => table.iter().map_err(db_err)?,
        };
        for entry in rows {
            let (_, v) = entry.map_err(db_err)?;
            let job: ScheduledJob = serde_json::from_slice(v.value()).map_err(db_err)?;
            result.push(job);
        }
        Ok(result)
    }
}

impl JobQueue for JobDb {
    fn create_or_update(
        &self,
        target: &str,
        direction: Direction,
        run_at: DateTime<Utc>,
        existing: Option<JobRef>,
    ) -> Result<JobRef> {
        let idx = index_key(target, direction);
        let wt = self.db.begin_write().map_err(db_err)?;
        let id = {
            let mut jobs = wt.open_table(JOBS).map_err(db_err)?;
            let mut index = wt.open_table(JOB_INDEX).map_err(db_err)?;

            let old_key = index
                .get(idx.as_str())
                .map_err(db_err)?
                .map(|guard| guard.value().to_vec());
            let current = match &old_key {
                Some(key) => jobs
                    .get(key.as_slice())
                    .map_err(db_err)?
                    .map(|guard| serde_json::from_slice::<ScheduledJob>(guard.value()))
                    .transpose()
                    .map_err(db_err)?,
                None => None,
            };

            let job = match current {
                Some(mut job) => {
                    if existing.is_some_and(|r| r != job.id) {
                        tracing::debug!(
                            target_slug = target,
                            %direction,
                            stale = ?existing,
                            indexed = %job.id,
                            "record carried a stale job ref; rescheduling the indexed job"
                        );
                    }
                    job.reschedule(run_at);
                    job
                }
                None => ScheduledJob::new(target, direction, run_at),
            };

            if let Some(key) = &old_key {
                jobs.remove(key.as_slice()).map_err(db_err)?;
            }
            let new_key = job_key(job.run_at, job.id.0);
            let value = serde_json::to_vec(&job).map_err(db_err)?;
            jobs.insert(new_key.as_slice(), value.as_slice())
                .map_err(db_err)?;
            index
                .insert(idx.as_str(), new_key.as_slice())
                .map_err(db_err)?;
            job.id
        };
        wt.commit().map_err(db_err)?;
        Ok(id)
    }

    fn get(&self, id: JobRef) -> Result<Option<ScheduledJob>> {
        Ok(self.scan(None)?.into_iter().find(|j| j.id == id))
    }

    fn list(&self) -> Result<Vec<ScheduledJob>> {
        self.scan(None)
    }

    fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>> {
        self.scan(Some(due_upper_bound(now)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
