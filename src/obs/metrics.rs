// self
use crate::{
	_prelude::*,
	obs::{FlowKind, FlowOutcome},
};

/// Counts one attempt, success, or failure against the global metrics recorder.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth1_broker_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Counts one failure labelled with its [`Error::class`](crate::error::Error::class).
pub fn record_flow_failure(kind: FlowKind, class: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth1_broker_flow_failures_total",
			"flow" => kind.as_str(),
			"error" => class
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, class);
	}
}

/// Records the wall-clock duration of one call, network time included.
pub fn record_flow_duration(kind: FlowKind, elapsed: StdDuration) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("oauth1_broker_flow_duration_seconds", "flow" => kind.as_str())
			.record(elapsed.as_secs_f64());
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, elapsed);
	}
}
