//! Metrics sink boundary.
//!
//! Lifecycle logic MUST NOT depend on `obs::metrics` directly. All
//! instrumentation flows through `MetricsEvent` and `MetricsSink`; this
//! module is the only bridge to the process-local counter state.

use crate::obs::metrics::{self, EventState};

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    ValidateStart { entity: &'a str },
    ValidateFinish { entity: &'a str, passed: bool },
    SaveStart { entity: &'a str },
    SaveFinish { entity: &'a str, persisted: bool },
    AttributesPurged { entity: &'a str, removed: u64 },
    AttributesHashed { entity: &'a str, rewritten: u64 },
    InputFlashed { entity: &'a str },
    RelationResolved { entity: &'a str },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default process-local sink that writes into the counter state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::ValidateStart { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.validate_calls = m.ops.validate_calls.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.validate_calls = entry.validate_calls.saturating_add(1);
                });
            }

            MetricsEvent::ValidateFinish { entity, passed } => {
                metrics::with_state_mut(|m| {
                    if passed {
                        m.ops.validations_passed = m.ops.validations_passed.saturating_add(1);
                    } else {
                        m.ops.validations_failed = m.ops.validations_failed.saturating_add(1);
                        let entry = m.entities.entry(entity.to_string()).or_default();
                        entry.validations_failed = entry.validations_failed.saturating_add(1);
                    }
                });
            }

            MetricsEvent::SaveStart { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.save_calls = m.ops.save_calls.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.save_calls = entry.save_calls.saturating_add(1);
                });
            }

            MetricsEvent::SaveFinish { entity, persisted } => {
                metrics::with_state_mut(|m| {
                    if persisted {
                        m.ops.saves_persisted = m.ops.saves_persisted.saturating_add(1);
                        let entry = m.entities.entry(entity.to_string()).or_default();
                        entry.saves_persisted = entry.saves_persisted.saturating_add(1);
                    } else {
                        m.ops.saves_rejected = m.ops.saves_rejected.saturating_add(1);
                    }
                });
            }

            MetricsEvent::AttributesPurged { removed, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.attributes_purged = m.ops.attributes_purged.saturating_add(removed);
                });
            }

            MetricsEvent::AttributesHashed { rewritten, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.attributes_hashed = m.ops.attributes_hashed.saturating_add(rewritten);
                });
            }

            MetricsEvent::InputFlashed { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.input_flashes = m.ops.input_flashes.saturating_add(1);
                });
            }

            MetricsEvent::RelationResolved { entity } => {
                metrics::with_state_mut(|m| {
                    m.ops.relations_resolved = m.ops.relations_resolved.saturating_add(1);
                    let entry = m.entities.entry(entity.to_string()).or_default();
                    entry.relations_resolved = entry.relations_resolved.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    GLOBAL_METRICS_SINK.record(event);
}

/// Snapshot the current counter state for endpoint/test plumbing.
#[must_use]
pub fn metrics_report() -> EventState {
    metrics::report()
}

/// Reset all counter state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

///
/// TESTS
///
