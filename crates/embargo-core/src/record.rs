//! The record seam the decision engine and the gate work against.
//!
//! Capabilities are probed, not inferred: a record is timing-capable when
//! `timing()` returns fields, and governed-capable when `governance()`
//! returns a binding (bound to a definition or not).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timing::TimingFields;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    TimingCapable,
    Plain,
}

// ---------------------------------------------------------------------------
// WorkflowBinding
// ---------------------------------------------------------------------------

/// Present on records that can be governed by an approval workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowBinding {
    /// Name of the bound workflow definition, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl WorkflowBinding {
    pub fn bound(definition: impl Into<String>) -> Self {
        Self {
            definition: Some(definition.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetRecord
// ---------------------------------------------------------------------------

pub trait TargetRecord {
    /// Identifier the job queue keys jobs by.
    fn id(&self) -> &str;

    fn timing(&self) -> Option<&TimingFields>;

    fn timing_mut(&mut self) -> Option<&mut TimingFields>;

    fn governance(&self) -> Option<&WorkflowBinding> {
        None
    }

    fn publish_now(&mut self) -> Result<()>;

    fn unpublish_now(&mut self) -> Result<()>;

    fn persist(&mut self) -> Result<()>;

    fn capability(&self) -> Capability {
        if self.timing().is_some() {
            Capability::TimingCapable
        } else {
            Capability::Plain
        }
    }
}
