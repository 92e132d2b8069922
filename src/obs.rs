//! Optional observability for outbound provider calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to wrap every call in an `oauth1_broker.flow` span carrying `flow`,
//!   `stage`, the provider `status` once known, and the `error` class on failure.
//! - Enable `metrics` to count attempts/successes/failures in `oauth1_broker_flow_total`,
//!   failures by class in `oauth1_broker_flow_failures_total`, and latency in the
//!   `oauth1_broker_flow_duration_seconds` histogram.
//!
//! Secrets never reach either sink; spans only carry static labels and status codes.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// std
use std::time::Instant;
// self
use crate::_prelude::*;

/// Outbound call kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Step 1: obtaining a request token.
	RequestToken,
	/// Step 3: trading the verifier for an access token.
	AccessToken,
	/// Signed call against the provider API.
	ApiCall,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::RequestToken => "request_token",
			FlowKind::AccessToken => "access_token",
			FlowKind::ApiCall => "api_call",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a flow span and records its outcome, failure class, and latency.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);
	let started = Instant::now();

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			span.record_error(e);
			record_flow_failure(kind, e.class());
			record_flow_outcome(kind, FlowOutcome::Failure);
		},
	}

	record_flow_duration(kind, started.elapsed());

	result
}
