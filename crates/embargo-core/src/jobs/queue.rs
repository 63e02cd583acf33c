use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::Direction;

use super::job::{JobRef, ScheduledJob};

// ---------------------------------------------------------------------------
// JobQueue
// ---------------------------------------------------------------------------

/// Storage for publish/unpublish jobs.
///
/// `create_or_update` is idempotent per `(target, direction)`: when a job
/// already exists for that pair, either by `existing` ref or by the queue's
/// own index, it is rescheduled in place and its ref is returned unchanged.
pub trait JobQueue {
    fn create_or_update(
        &self,
        target: &str,
        direction: Direction,
        run_at: DateTime<Utc>,
        existing: Option<JobRef>,
    ) -> Result<JobRef>;

    fn get(&self, id: JobRef) -> Result<Option<ScheduledJob>>;

    /// All jobs, ordered by `run_at` ascending.
    fn list(&self) -> Result<Vec<ScheduledJob>>;

    /// Jobs whose `run_at` is at or before `now`, ordered by `run_at`.
    fn due(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledJob>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|job| job.is_due(now))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryJobQueue
// ---------------------------------------------------------------------------

/// In-process queue. Suitable for a single request or for tests.
#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    jobs: RefCell<HashMap<JobRef, ScheduledJob>>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.borrow().is_empty()
    }
}

impl JobQueue for MemoryJobQueue {
    fn create_or_update(
        &self,
        target: &str,
        direction: Direction,
        run_at: DateTime<Utc>,
        existing: Option<JobRef>,
    ) -> Result<JobRef> {
        let mut jobs = self.jobs.borrow_mut();

        let current = existing
            .filter(|id| {
                jobs.get(id)
                    .is_some_and(|j| j.target == target && j.direction == direction)
            })
            .or_else(|| {
                jobs.values()
                    .find(|j| j.target == target && j.direction == direction)
                    .map(|j| j.id)
            });

        if let Some(id) = current {
            if let Some(job) = jobs.get_mut(&id) {
                job.reschedule(run_at);
                return Ok(id);
            }
        }

        let job = ScheduledJob::new(target, direction, run_at);
        let id = job.id;
        jobs.insert(id, job);
        Ok(id)
    }

    fn get(&self, id: JobRef) -> Result<Option<ScheduledJob>> {
        Ok(self.jobs.borrow().get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<ScheduledJob>> {
        let mut all: Vec<ScheduledJob> = self.jobs.borrow().values().cloned().collect();
        all.sort_by(|a, b| a.run_at.cmp(&b.run_at));
        Ok(all)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
