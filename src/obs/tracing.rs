// self
use crate::{_prelude::*, auth::UserId, obs::FlowKind};

/// Future returned by [`FlowSpan::instrument`]; the bare future when tracing is compiled out.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`]; the bare future when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// `polar_bridge.flow` span opened once per callback or physical-info request.
///
/// The `user_id` field starts empty and is filled in with [`FlowSpan::record_user`] as soon as
/// the flow knows which AccessLink member it serves.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	kind: FlowKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens the span; `operation` names the bridge method that started the flow.
	pub fn new(kind: FlowKind, operation: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"polar_bridge.flow",
				flow = kind.as_str(),
				operation,
				user_id = tracing::field::Empty,
			);

			Self { kind, span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = operation;

			Self { kind }
		}
	}

	/// Flow kind the span was opened for.
	pub fn kind(&self) -> FlowKind {
		self.kind
	}

	/// Attaches the member identifier to the span.
	pub fn record_user(&self, user_id: &UserId) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("user_id", user_id.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = user_id;
		}
	}

	/// Emits a debug event for a move between two named stages.
	pub fn transition(&self, from: &'static str, to: &'static str) {
		#[cfg(feature = "tracing")]
		{
			tracing::debug!(parent: &self.span, from, to, "stage transition");
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (from, to);
		}
	}

	/// Runs `fut` inside the span without holding a guard across `.await` points.
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
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn span_calls_work_without_a_subscriber() {
		let span = FlowSpan::new(FlowKind::PhysicalInfo, "physical_info");

		span.record_user(&UserId::new("12345").expect("User fixture should be valid."));
		span.transition("lookup_token", "fetch_resource");

		assert_eq!(span.kind(), FlowKind::PhysicalInfo);
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrumented_futures_keep_their_output() {
		let span = FlowSpan::new(FlowKind::AuthorizationCallback, "complete_authorization");

		assert_eq!(span.instrument(async { "done" }).await, "done");
	}
}
