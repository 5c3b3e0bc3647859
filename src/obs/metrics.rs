// self
use crate::obs::CallOutcome;

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(api: &str, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mtls_auth_client_call_total",
			"api" => api.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (api, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_call_outcome_without_recorder_is_noop() {
		record_call_outcome("token/revoke", CallOutcome::TransportError);
	}
}
