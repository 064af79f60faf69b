// self
use crate::obs::{FlowOutcome, FlowStage};

/// Records a stage outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(stage: FlowStage, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cognito_signup_flow_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}
