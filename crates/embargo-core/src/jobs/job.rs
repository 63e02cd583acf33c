//! Scheduled publication job model.
//!
//! A `ScheduledJob` is the queue's record of "at `run_at`, move `target` in
//! `direction`". The queue never holds more than one job per target and
//! direction; rescheduling rewrites `run_at` and keeps the `JobRef`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::types::Direction;

// ---------------------------------------------------------------------------
// JobRef
// ---------------------------------------------------------------------------

/// Stable handle to a scheduled job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobRef(pub Uuid);

impl JobRef {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ScheduledJob
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: JobRef,
    /// Slug of the record the job acts on.
    pub target: String,
    pub direction: Direction,
    pub run_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduledJob {
    pub fn new(target: impl Into<String>, direction: Direction, run_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: JobRef::new(),
            target: target.into(),
            direction,
            run_at,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the job to a new run time in place.
    pub fn reschedule(&mut self, run_at: DateTime<Utc>) {
        self.run_at = run_at;
        self.updated_at = Utc::now();
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.run_at <= now
    }
}
