// self
use crate::obs::{FlowKind, FlowOutcome};

/// Increments the flow counter via the global metrics recorder (when enabled).
pub fn count_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"carrier_rates_flow_total",
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

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn count_flow_outcome_without_recorder_is_noop() {
		count_flow_outcome(FlowKind::TokenFetch, FlowOutcome::Failure);
	}
}
