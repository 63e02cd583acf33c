//! Embargo/expiry job scheduling on the ordinary save path.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::gate::SuppressionGate;
use crate::jobs::{JobQueue, JobRef};
use crate::record::TargetRecord;
use crate::types::Direction;

/// Create or reschedule the record's job for `direction` and commit it onto
/// the record's timing fields. Plain records are left alone.
///
/// Does not persist; callers persist once after all scheduling.
pub fn schedule(
    target: &mut dyn TargetRecord,
    jobs: &dyn JobQueue,
    direction: Direction,
    at: DateTime<Utc>,
) -> Result<Option<JobRef>> {
    let id = target.id().to_string();
    let Some(timing) = target.timing_mut() else {
        return Ok(None);
    };
    let job = jobs.create_or_update(&id, direction, at, timing.job(direction))?;
    timing.commit(direction, at, job);
    tracing::info!(item = %id, %direction, run_at = %at.to_rfc3339(), job = %job, "job scheduled");
    Ok(Some(job))
}

/// Save a record, queueing jobs for its desired dates unless a governing
/// workflow suppresses that. Returns the jobs queued.
///
/// The resulting publish/unpublish window is validated before any job is
/// queued.
pub fn write(
    record: &mut dyn TargetRecord,
    jobs: &dyn JobQueue,
    gate: &SuppressionGate<'_>,
) -> Result<Vec<(Direction, JobRef)>> {
    let mut plan = Vec::new();

    if let Some(timing) = record.timing() {
        for &direction in Direction::all() {
            let Some(at) = timing.explicit(direction) else {
                continue;
            };
            if !gate.can_queue(direction, &*record) {
                tracing::debug!(
                    item = record.id(),
                    %direction,
                    "governed by a workflow; deferring job to workflow completion"
                );
                continue;
            }
            plan.push((direction, at));
        }

        let planned = |d: Direction| plan.iter().find(|(p, _)| *p == d).map(|&(_, at)| at);
        timing.validate_projected(planned(Direction::Publish), planned(Direction::Unpublish))?;
    }

    let mut queued = Vec::new();
    for (direction, at) in plan {
        if let Some(job) = schedule(&mut *record, jobs, direction, at)? {
            queued.push((direction, job));
        }
    }

    record.persist()?;
    Ok(queued)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmbargoError;
    use crate::jobs::MemoryJobQueue;
    use chrono::TimeZone;
    use crate::testing::{at, FakeRecord};
    use crate::workflow::{ActionConfig, WorkflowDefinition};
    use std::collections::BTreeMap;

    fn definitions() -> BTreeMap<String, WorkflowDefinition> {
        let mut defs = BTreeMap::new();
        defs.insert(
            "request-publication".to_string(),
            WorkflowDefinition {
                description: None,
                actions: vec![ActionConfig::Publish { delay_days: 0 }],
            },
        );
        defs
    }

    #[test]
    fn ungoverned_save_queues_both_jobs() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let queue = MemoryJobQueue::new();
        let mut record = FakeRecord::timed("home").with_desired(Some(at(6)), Some(at(8)));

        let queued = write(&mut record, &queue, &gate).unwrap();

        assert_eq!(queued.len(), 2);
        assert_eq!(queue.len(), 2);
        let fields = record.fields();
        assert_eq!(fields.desired_publish_at, None);
        assert_eq!(fields.publish_on_at, Some(at(6)));
        assert_eq!(fields.unpublish_on_at, Some(at(8)));
        assert_eq!(record.persist_calls, 1);
    }

    #[test]
    fn governed_save_defers_jobs() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let queue = MemoryJobQueue::new();
        let mut record = FakeRecord::timed("home")
            .with_desired(Some(at(6)), Some(at(8)))
            .governed(Some("request-publication"));

        let queued = write(&mut record, &queue, &gate).unwrap();

        assert!(queued.is_empty());
        assert!(queue.is_empty());
        let fields = record.fields();
        assert_eq!(fields.desired_publish_at, Some(at(6)));
        assert_eq!(fields.desired_unpublish_at, Some(at(8)));
        assert_eq!(fields.publish_on_at, None);
        assert_eq!(fields.publish_job, None);
        assert_eq!(fields.unpublish_job, None);
        assert_eq!(record.persist_calls, 1);
    }

    #[test]
    fn plain_record_is_only_persisted() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let queue = MemoryJobQueue::new();
        let mut record = FakeRecord::plain("home");

        assert!(write(&mut record, &queue, &gate).unwrap().is_empty());
        assert!(queue.is_empty());
        assert_eq!(record.persist_calls, 1);
    }

    #[test]
    fn inverted_window_is_rejected_before_queueing() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let queue = MemoryJobQueue::new();
        let mut record = FakeRecord::timed("home").with_desired(Some(at(8)), Some(at(6)));

        let err = write(&mut record, &queue, &gate).unwrap_err();

        assert!(matches!(err, EmbargoError::Validation(_)));
        assert!(queue.is_empty());
        assert_eq!(record.fields().publish_job, None);
        assert_eq!(record.fields().unpublish_job, None);
        assert_eq!(record.persist_calls, 0);
    }

    #[test]
    fn epoch_desired_date_is_not_queued() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let queue = MemoryJobQueue::new();
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        let mut record = FakeRecord::timed("home").with_desired(Some(epoch), Some(at(8)));

        let queued = write(&mut record, &queue, &gate).unwrap();

        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].0, Direction::Unpublish);
        assert_eq!(queue.len(), 1);
        assert_eq!(record.fields().publish_job, None);
    }

    #[test]
    fn schedule_on_plain_record_is_noop() {
        let queue = MemoryJobQueue::new();
        let mut record = FakeRecord::plain("home");
        let job = schedule(&mut record, &queue, Direction::Publish, at(6)).unwrap();
        assert!(job.is_none());
        assert!(queue.is_empty());
    }
}
