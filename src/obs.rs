//! Observability helpers for carrier calls.
//!
//! # Feature Flags
//!
//! - `tracing` (default) wraps token fetches and rating calls in spans named
//!   `carrier_rates.flow` with `flow` and `stage` fields, and emits one event per recorded
//!   outcome.
//! - `metrics` increments the `carrier_rates_flow_total` counter for every recorded outcome,
//!   labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Flows observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Client-credentials exchange against the token endpoint.
	TokenFetch,
	/// Rate-quote call, including its single retry.
	RateQuote,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::TokenFetch => "token_fetch",
			FlowKind::RateQuote => "rate_quote",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Stale token detected; the call is being retried with a fresh credential.
	Retry,
	/// Cached credential reused without contacting the token endpoint.
	CacheHit,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
			FlowOutcome::Retry => "retry",
			FlowOutcome::CacheHit => "cache_hit",
		}
	}

	/// Returns `true` for outcomes worth surfacing above debug level.
	pub const fn is_notable(self) -> bool {
		matches!(self, FlowOutcome::Failure | FlowOutcome::Retry)
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a flow outcome in every enabled backend.
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	count_flow_outcome(kind, outcome);
	trace_flow_outcome(kind, outcome);
}
