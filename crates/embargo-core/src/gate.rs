use std::collections::BTreeMap;

use crate::record::{TargetRecord, WorkflowBinding};
use crate::types::Direction;
use crate::workflow::WorkflowDefinition;

// ---------------------------------------------------------------------------
// DefinitionLookup
// ---------------------------------------------------------------------------

/// Resolves the workflow definitions that govern a binding.
pub trait DefinitionLookup {
    fn definitions_for(&self, binding: &WorkflowBinding) -> Vec<&WorkflowDefinition>;
}

impl DefinitionLookup for BTreeMap<String, WorkflowDefinition> {
    fn definitions_for(&self, binding: &WorkflowBinding) -> Vec<&WorkflowDefinition> {
        binding
            .definition
            .as_deref()
            .and_then(|name| self.get(name))
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SuppressionGate
// ---------------------------------------------------------------------------

/// Decides whether the ordinary save path may queue embargo/expiry jobs.
///
/// While a workflow governs the record, scheduling changes go through review
/// like any other change; the publication action queues the jobs once the
/// workflow completes.
pub struct SuppressionGate<'a> {
    definitions: &'a dyn DefinitionLookup,
}

impl<'a> SuppressionGate<'a> {
    pub fn new(definitions: &'a dyn DefinitionLookup) -> Self {
        Self { definitions }
    }

    pub fn can_auto_schedule(&self, record: &dyn TargetRecord) -> bool {
        let Some(binding) = record.governance() else {
            return true;
        };
        self.definitions.definitions_for(binding).is_empty()
    }

    pub fn publish_job_can_be_queued(&self, record: &dyn TargetRecord) -> bool {
        self.can_auto_schedule(record)
    }

    pub fn unpublish_job_can_be_queued(&self, record: &dyn TargetRecord) -> bool {
        self.can_auto_schedule(record)
    }

    pub fn can_queue(&self, direction: Direction, record: &dyn TargetRecord) -> bool {
        match direction {
            Direction::Publish => self.publish_job_can_be_queued(record),
            Direction::Unpublish => self.unpublish_job_can_be_queued(record),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRecord;
    use crate::workflow::ActionConfig;

    fn definitions() -> BTreeMap<String, WorkflowDefinition> {
        let mut defs = BTreeMap::new();
        defs.insert(
            "approve-publication".to_string(),
            WorkflowDefinition {
                description: None,
                actions: vec![ActionConfig::Publish { delay_days: 0 }],
            },
        );
        defs
    }

    #[test]
    fn record_without_workflow_capability_may_schedule() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let record = FakeRecord::timed("home");
        assert!(gate.can_auto_schedule(&record));
    }

    #[test]
    fn unbound_record_may_schedule() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let record = FakeRecord::timed("home").governed(None);
        assert!(gate.can_auto_schedule(&record));
    }

    #[test]
    fn bound_record_is_suppressed_in_both_directions() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let record = FakeRecord::timed("home").governed(Some("approve-publication"));
        assert!(!gate.can_auto_schedule(&record));
        assert!(!gate.publish_job_can_be_queued(&record));
        assert!(!gate.unpublish_job_can_be_queued(&record));
        for &direction in Direction::all() {
            assert!(!gate.can_queue(direction, &record));
        }
    }

    #[test]
    fn binding_to_unknown_definition_does_not_govern() {
        let defs = definitions();
        let gate = SuppressionGate::new(&defs);
        let record = FakeRecord::timed("home").governed(Some("retired-workflow"));
        assert!(gate.can_auto_schedule(&record));
    }
}
