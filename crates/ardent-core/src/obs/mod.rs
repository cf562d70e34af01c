//! Observability: lifecycle telemetry counters behind a sink boundary.
//!
//! Executor logic does not touch the counter state directly; all
//! instrumentation flows through `MetricsEvent` and `MetricsSink`.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::{EntityCounters, EventOps, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
