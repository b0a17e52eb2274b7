// self
use crate::{
	_prelude::*,
	error::FaultClass,
	obs::{FlowKind, FlowOutcome},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"polar_bridge_flow_total",
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

/// Records the terminal outcome of a flow; failures also bump a per-fault-class counter.
pub fn record_flow_result<T>(kind: FlowKind, result: &Result<T>) {
	match result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(e) => {
			record_flow_outcome(kind, FlowOutcome::Failure);
			record_fault(kind, e.fault_class());
		},
	}
}

fn record_fault(kind: FlowKind, class: FaultClass) {
	#[cfg(feature = "metrics")]
	{
		let fault = match class {
			FaultClass::Client => "client",
			FaultClass::Server => "server",
		};

		metrics::counter!(
			"polar_bridge_flow_fault_total",
			"flow" => kind.as_str(),
			"fault" => fault
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, class);
	}
}
