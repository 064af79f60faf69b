// self
use crate::{_prelude::*, error::HandlerError, obs::FlowStage, provider::ProviderId};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by the sign-up flow.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provider + stage.
	pub fn new(provider: &ProviderId, stage: FlowStage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("cognito_signup.flow", provider = %provider, stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

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
}

/// Emits a `warn` event for an error consumed by an error handler.
pub fn log_handled_error(err: &HandlerError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			kind = ?err.kind,
			status = err.status,
			message = %err.message,
			"flow error handled"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
