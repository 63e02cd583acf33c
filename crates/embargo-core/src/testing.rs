//! Shared test doubles.

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{EmbargoError, Result};
use crate::record::{TargetRecord, WorkflowBinding};
use crate::timing::TimingFields;

/// Noon UTC on the given day of January 2014.
pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 1, day, 12, 0, 0).unwrap()
}

/// The fixed clock used across tests: 2014-01-05 12:00 UTC.
pub fn now() -> DateTime<Utc> {
    at(5)
}

#[derive(Debug, Default)]
pub struct FakeRecord {
    pub id: String,
    pub timing: Option<TimingFields>,
    pub governance: Option<WorkflowBinding>,
    pub published: bool,
    pub publish_calls: u32,
    pub unpublish_calls: u32,
    pub persist_calls: u32,
    pub reject_persist: bool,
}

impl FakeRecord {
    pub fn plain(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn timed(id: &str) -> Self {
        Self {
            id: id.to_string(),
            timing: Some(TimingFields::default()),
            ..Default::default()
        }
    }

    pub fn with_desired(
        mut self,
        publish: Option<DateTime<Utc>>,
        unpublish: Option<DateTime<Utc>>,
    ) -> Self {
        let timing = self.timing.get_or_insert_with(TimingFields::default);
        timing.desired_publish_at = publish;
        timing.desired_unpublish_at = unpublish;
        self
    }

    pub fn governed(mut self, definition: Option<&str>) -> Self {
        self.governance = Some(WorkflowBinding {
            definition: definition.map(str::to_string),
        });
        self
    }

    pub fn rejecting_persist(mut self) -> Self {
        self.reject_persist = true;
        self
    }

    pub fn fields(&self) -> &TimingFields {
        self.timing.as_ref().unwrap()
    }
}

impl TargetRecord for FakeRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn timing(&self) -> Option<&TimingFields> {
        self.timing.as_ref()
    }

    fn timing_mut(&mut self) -> Option<&mut TimingFields> {
        self.timing.as_mut()
    }

    fn governance(&self) -> Option<&WorkflowBinding> {
        self.governance.as_ref()
    }

    fn publish_now(&mut self) -> Result<()> {
        self.publish_calls += 1;
        self.published = true;
        Ok(())
    }

    fn unpublish_now(&mut self) -> Result<()> {
        self.unpublish_calls += 1;
        self.published = false;
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        if self.reject_persist {
            return Err(EmbargoError::Validation("rejected by test".to_string()));
        }
        self.persist_calls += 1;
        Ok(())
    }
}
