//! Optional observability helpers for bridge flows.
//!
//! # Feature Flags
//!
//! - `tracing` opens one `polar_bridge.flow` span per request carrying `flow`, `operation`, and
//!   the member's `user_id`, with a debug event per stage transition.
//! - `metrics` counts attempts and terminal outcomes in `polar_bridge_flow_total` (labels
//!   `flow`, `outcome`) and failures per fault class in `polar_bridge_flow_fault_total`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization callback: code exchange, token storage, and registration.
	AuthorizationCallback,
	/// Stored-token lookup followed by the physical information fetch.
	PhysicalInfo,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCallback => "authorization_callback",
			FlowKind::PhysicalInfo => "physical_info",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a bridge flow.
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
