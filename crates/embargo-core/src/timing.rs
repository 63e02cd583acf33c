use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EmbargoError, Result};
use crate::jobs::JobRef;
use crate::types::Direction;

// ---------------------------------------------------------------------------
// TimingFields
// ---------------------------------------------------------------------------

/// Embargo and expiry state carried by a timing-capable record.
///
/// A desired date is editor intent. Once a job is scheduled for it, the date
/// moves to the matching `*_on_at` field, the job ref is recorded and the
/// desired date is cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_publish_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_unpublish_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_on_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpublish_on_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_job: Option<JobRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpublish_job: Option<JobRef>,
}

impl TimingFields {
    pub fn desired(&self, direction: Direction) -> Option<DateTime<Utc>> {
        match direction {
            Direction::Publish => self.desired_publish_at,
            Direction::Unpublish => self.desired_unpublish_at,
        }
    }

    /// Desired date as epoch seconds, `0` when unset.
    pub fn desired_ts(&self, direction: Direction) -> i64 {
        self.desired(direction).map_or(0, |dt| dt.timestamp())
    }

    pub fn set_desired(&mut self, direction: Direction, at: Option<DateTime<Utc>>) {
        match direction {
            Direction::Publish => self.desired_publish_at = at,
            Direction::Unpublish => self.desired_unpublish_at = at,
        }
    }

    pub fn on_at(&self, direction: Direction) -> Option<DateTime<Utc>> {
        match direction {
            Direction::Publish => self.publish_on_at,
            Direction::Unpublish => self.unpublish_on_at,
        }
    }

    pub fn job(&self, direction: Direction) -> Option<JobRef> {
        match direction {
            Direction::Publish => self.publish_job,
            Direction::Unpublish => self.unpublish_job,
        }
    }

    /// Record that `job` will move the record in `direction` at `at`.
    pub fn commit(&mut self, direction: Direction, at: DateTime<Utc>, job: JobRef) {
        match direction {
            Direction::Publish => {
                self.publish_on_at = Some(at);
                self.publish_job = Some(job);
                self.desired_publish_at = None;
            }
            Direction::Unpublish => {
                self.unpublish_on_at = Some(at);
                self.unpublish_job = Some(job);
                self.desired_unpublish_at = None;
            }
        }
    }

    /// Desired date, with the epoch treated as unset like `desired_ts` does.
    pub fn explicit(&self, direction: Direction) -> Option<DateTime<Utc>> {
        self.desired(direction).filter(|at| at.timestamp() != 0)
    }

    pub fn validate(&self) -> Result<()> {
        check_window(self.publish_on_at, self.unpublish_on_at)
    }

    /// Validate the on-dates as they will stand once jobs are scheduled at
    /// `publish` / `unpublish`. Unscheduled directions keep their current
    /// on-date.
    pub fn validate_projected(
        &self,
        publish: Option<DateTime<Utc>>,
        unpublish: Option<DateTime<Utc>>,
    ) -> Result<()> {
        check_window(
            publish.or(self.publish_on_at),
            unpublish.or(self.unpublish_on_at),
        )
    }
}

fn check_window(publish: Option<DateTime<Utc>>, unpublish: Option<DateTime<Utc>>) -> Result<()> {
    if let (Some(publish), Some(unpublish)) = (publish, unpublish) {
        if unpublish <= publish {
            return Err(EmbargoError::Validation(format!(
                "unpublish date {} must be after publish date {}",
                unpublish.to_rfc3339(),
                publish.to_rfc3339()
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
