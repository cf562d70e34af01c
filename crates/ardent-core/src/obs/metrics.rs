use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// Metrics
/// Ephemeral, in-memory counters for lifecycle operations. Saturating;
/// never affect control flow.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Lifecycle entrypoints
    pub validate_calls: u64,
    pub validations_passed: u64,
    pub validations_failed: u64,
    pub save_calls: u64,
    pub saves_persisted: u64,
    pub saves_rejected: u64,

    // Attribute rewrites
    pub attributes_purged: u64,
    pub attributes_hashed: u64,

    // Collaborator traffic
    pub input_flashes: u64,
    pub relations_resolved: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EntityCounters {
    pub validate_calls: u64,
    pub validations_failed: u64,
    pub save_calls: u64,
    pub saves_persisted: u64,
    pub relations_resolved: u64,
}

thread_local! {
    static STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

pub(crate) fn with_state_mut<T>(f: impl FnOnce(&mut EventState) -> T) -> T {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

pub(crate) fn with_state<T>(f: impl FnOnce(&EventState) -> T) -> T {
    STATE.with(|state| f(&state.borrow()))
}

/// Clone the current counter state for endpoint/test plumbing.
#[must_use]
pub(crate) fn report() -> EventState {
    with_state(Clone::clone)
}

/// Reset all counter state.
pub(crate) fn reset_all() {
    with_state_mut(|state| *state = EventState::default());
}
