// self
use crate::{_prelude::*, obs::FlowKind};

/// Resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span covering one outbound provider call.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`; `status` and `error` start empty.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth1_broker.flow",
				flow = kind.as_str(),
				stage,
				status = tracing::field::Empty,
				error = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Marks the span as failed and logs the error at debug level.
	pub fn record_error(&self, err: &Error) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("error", err.class());

			tracing::debug!(parent: &self.span, error = %err, "provider call failed");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = err;
		}
	}
}

/// Stores the provider's HTTP status on the innermost flow span, if one is active.
pub fn record_provider_status(status: u16) {
	#[cfg(feature = "tracing")]
	{
		tracing::Span::current().record("status", status);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = status;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::TransportError;

	#[tokio::test]
	async fn status_is_recorded_inside_instrumented_calls() {
		let span = FlowSpan::new(FlowKind::ApiCall, "status");
		let value = span
			.instrument(async {
				record_provider_status(201);

				"done"
			})
			.await;

		assert_eq!(value, "done");

		span.record_error(&TransportError::Timeout.into());
	}

	#[test]
	fn recording_outside_a_span_is_harmless() {
		record_provider_status(500);
	}
}
