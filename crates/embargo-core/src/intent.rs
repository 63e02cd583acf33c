use crate::record::{Capability, TargetRecord};
use crate::types::Direction;

/// True when the record carries embargo/expiry fields.
pub fn has_timing_capability(target: &dyn TargetRecord) -> bool {
    target.capability() == Capability::TimingCapable
}

/// True when an action's fallback delay applies to this record.
pub fn has_fallback_delay(target: &dyn TargetRecord, delay_days: u32) -> bool {
    has_timing_capability(target) && delay_days > 0
}

/// Does the record carry any timing intent for an action in `direction`?
///
/// Publish: either desired date set, or a fallback delay.
/// Unpublish: desired publish date set, desired unpublish date *unset*, or a
/// fallback delay. The unpublish side deliberately tests `== 0`.
pub fn has_timing_intent(target: &dyn TargetRecord, direction: Direction, delay_days: u32) -> bool {
    let Some(timing) = target.timing() else {
        return false;
    };

    let publish_ts = timing.desired_ts(Direction::Publish);
    let unpublish_ts = timing.desired_ts(Direction::Unpublish);

    let explicit = match direction {
        Direction::Publish => publish_ts > 0 || unpublish_ts > 0,
        Direction::Unpublish => publish_ts > 0 || unpublish_ts == 0,
    };

    explicit || has_fallback_delay(target, delay_days)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
