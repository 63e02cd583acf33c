//! Publication actions: the step a workflow runs when it completes.
//!
//! A `PublicationAction` either moves the record right away or turns the
//! record's timing intent into at most one publish job and at most one
//! unpublish job. Both directions share one algorithm, parameterised by the
//! action's own direction:
//!
//! 1. No timing intent: publish/unpublish now.
//! 2. Otherwise, in order:
//!    - the *opposite* direction's desired date, if set, gets its job;
//!    - the action's own desired date, if set, gets its job and selection stops;
//!    - else the action's fallback delay, if any, schedules its own job at
//!      `now + delay_days`.
//!
//!    The record is persisted once, after every queue call.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::embargo::schedule;
use crate::error::{EmbargoError, Result};
use crate::intent::{has_fallback_delay, has_timing_intent};
use crate::jobs::JobQueue;
use crate::record::TargetRecord;
use crate::types::{Decision, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationAction {
    pub direction: Direction,
    /// Fallback delay in days; `0` means none configured.
    pub delay_days: u32,
}

impl PublicationAction {
    pub fn new(direction: Direction, delay_days: u32) -> Self {
        Self {
            direction,
            delay_days,
        }
    }

    pub fn publish(delay_days: u32) -> Self {
        Self::new(Direction::Publish, delay_days)
    }

    pub fn unpublish(delay_days: u32) -> Self {
        Self::new(Direction::Unpublish, delay_days)
    }

    pub fn has_timing_intent(&self, target: &dyn TargetRecord) -> bool {
        has_timing_intent(target, self.direction, self.delay_days)
    }

    /// Run the action against `target`. `now` anchors the fallback delay.
    pub fn reconcile(
        &self,
        target: &mut dyn TargetRecord,
        jobs: &dyn JobQueue,
        now: DateTime<Utc>,
    ) -> Result<Decision> {
        if !self.has_timing_intent(&*target) {
            match self.direction {
                Direction::Publish => target.publish_now()?,
                Direction::Unpublish => target.unpublish_now()?,
            }
            tracing::info!(item = target.id(), direction = %self.direction, "no timing intent; acted immediately");
            return Ok(Decision::Immediate {
                direction: self.direction,
            });
        }

        let (publish_at, unpublish_at) = self.queue_jobs(target, jobs, now)?;
        target.persist()?;

        let decision = Decision::from_scheduled(publish_at, unpublish_at);
        tracing::debug!(item = target.id(), direction = %self.direction, ?decision, "timing intent reconciled");
        Ok(decision)
    }

    /// Returns the publish and unpublish run times scheduled, if any.
    ///
    /// The whole plan is computed and validated before the first queue call,
    /// so a rejected window leaves no jobs behind.
    fn queue_jobs(
        &self,
        target: &mut dyn TargetRecord,
        jobs: &dyn JobQueue,
        now: DateTime<Utc>,
    ) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let own = self.direction;
        let other = own.opposite();

        let Some(timing) = target.timing() else {
            return Ok((None, None));
        };

        let mut plan = Scheduled::default();
        if let Some(at) = timing.explicit(other) {
            plan.set(other, at);
        }
        if let Some(at) = timing.explicit(own) {
            plan.set(own, at);
        } else if has_fallback_delay(&*target, self.delay_days) {
            plan.set(own, self.fallback_at(now)?);
        }
        timing.validate_projected(plan.publish, plan.unpublish)?;

        for direction in [other, own] {
            if let Some(at) = plan.get(direction) {
                schedule(&mut *target, jobs, direction, at)?;
            }
        }

        Ok((plan.publish, plan.unpublish))
    }

    fn fallback_at(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        Duration::try_days(i64::from(self.delay_days))
            .and_then(|delay| now.checked_add_signed(delay))
            .ok_or_else(|| {
                EmbargoError::Validation(format!(
                    "delay of {} days from {} is out of range",
                    self.delay_days,
                    now.to_rfc3339()
                ))
            })
    }
}

#[derive(Default)]
struct Scheduled {
    publish: Option<DateTime<Utc>>,
    unpublish: Option<DateTime<Utc>>,
}

impl Scheduled {
    fn set(&mut self, direction: Direction, at: DateTime<Utc>) {
        match direction {
            Direction::Publish => self.publish = Some(at),
            Direction::Unpublish => self.unpublish = Some(at),
        }
    }

    fn get(&self, direction: Direction) -> Option<DateTime<Utc>> {
        match direction {
            Direction::Publish => self.publish,
            Direction::Unpublish => self.unpublish,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
