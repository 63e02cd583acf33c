use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::PublicationAction;
use crate::error::Result;
use crate::jobs::JobQueue;
use crate::record::TargetRecord;
use crate::types::{Decision, Direction};

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

/// A publication step as configured on a workflow definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ActionConfig {
    Publish {
        #[serde(default)]
        delay_days: u32,
    },
    Unpublish {
        #[serde(default)]
        delay_days: u32,
    },
}

impl ActionConfig {
    pub fn direction(&self) -> Direction {
        match self {
            ActionConfig::Publish { .. } => Direction::Publish,
            ActionConfig::Unpublish { .. } => Direction::Unpublish,
        }
    }

    pub fn delay_days(&self) -> u32 {
        match self {
            ActionConfig::Publish { delay_days } | ActionConfig::Unpublish { delay_days } => {
                *delay_days
            }
        }
    }

    pub fn to_action(self) -> PublicationAction {
        PublicationAction::new(self.direction(), self.delay_days())
    }
}

// ---------------------------------------------------------------------------
// WorkflowDefinition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// Everything a step needs from the workflow engine that runs it.
pub struct StepContext<'a> {
    /// `None` when the workflow's target has been deleted or is unreachable.
    pub target: Option<&'a mut dyn TargetRecord>,
    pub jobs: &'a dyn JobQueue,
    pub now: DateTime<Utc>,
    /// Decisions made by the steps run so far, in order.
    pub decisions: Vec<Decision>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        target: Option<&'a mut dyn TargetRecord>,
        jobs: &'a dyn JobQueue,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            target,
            jobs,
            now,
            decisions: Vec::new(),
        }
    }
}

pub trait WorkflowStep {
    /// Returns whether the workflow may proceed. Failures are errors.
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<bool>;
}

impl WorkflowStep for PublicationAction {
    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<bool> {
        let decision = match ctx.target.as_mut() {
            Some(target) => self.reconcile(&mut **target, ctx.jobs, ctx.now)?,
            None => {
                tracing::warn!(direction = %self.direction, "workflow target is missing; nothing to do");
                Decision::NoOp
            }
        };
        ctx.decisions.push(decision);
        Ok(true)
    }
}

/// Run every publication action of `definition` once, in order.
pub fn complete<'a>(
    definition: &WorkflowDefinition,
    target: Option<&'a mut dyn TargetRecord>,
    jobs: &'a dyn JobQueue,
    now: DateTime<Utc>,
) -> Result<Vec<Decision>> {
    let mut ctx = StepContext::new(target, jobs, now);
    for action in &definition.actions {
        action.to_action().execute(&mut ctx)?;
    }
    Ok(ctx.decisions)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
