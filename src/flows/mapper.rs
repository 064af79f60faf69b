//! Maps missing configuration and provider rejections into [`HandlerError`]s and routes them
//! through the flow's [`ErrorPolicy`].

// self
use crate::{
	_prelude::*,
	config::ConfigKey,
	error::{HandlerError, HandlerErrorKind},
	flows::{FlowResponse, SignupRequest},
	oauth::ProviderErrorPayload,
	obs,
	provider::ProviderId,
};

/// Fallback reason when a rejection carries neither a description nor an error code.
pub const UNKNOWN_REASON: &str = "Unknown error";

/// Callback that turns a structured error into a response.
pub trait ErrorHandler
where
	Self: Send + Sync,
{
	/// Produces the response sent for `error`.
	fn handle(&self, request: &SignupRequest, error: HandlerError) -> FlowResponse;
}
impl<F> ErrorHandler for F
where
	F: Fn(&SignupRequest, HandlerError) -> FlowResponse + Send + Sync,
{
	fn handle(&self, request: &SignupRequest, error: HandlerError) -> FlowResponse {
		self(request, error)
	}
}

/// What the flow does with a [`HandlerError`].
#[derive(Clone, Default)]
pub enum ErrorPolicy {
	/// Return the error to the caller as [`Error::Handler`].
	#[default]
	Raise,
	/// Hand the error to a callback and answer with its response.
	DelegateTo(Arc<dyn ErrorHandler>),
}
impl ErrorPolicy {
	/// Delegates errors to `handler`.
	pub fn delegate(handler: impl 'static + ErrorHandler) -> Self {
		Self::DelegateTo(Arc::new(handler))
	}

	/// Logs the error and sends the user home.
	pub fn redirect_home() -> Self {
		Self::delegate(|_: &SignupRequest, error: HandlerError| {
			obs::log_handled_error(&error);

			FlowResponse::home()
		})
	}

	/// Applies the policy to `error`.
	pub fn apply(&self, request: &SignupRequest, error: HandlerError) -> Result<FlowResponse> {
		match self {
			Self::Raise => Err(error.into()),
			Self::DelegateTo(handler) => Ok(handler.handle(request, error)),
		}
	}
}
impl Debug for ErrorPolicy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Raise => f.write_str("Raise"),
			Self::DelegateTo(_) => f.write_str("DelegateTo(..)"),
		}
	}
}

/// Builds the 500 error listing the environment variables to set for `missing`.
pub fn missing_configuration(provider: &ProviderId, missing: &[ConfigKey]) -> HandlerError {
	let names = missing.iter().map(|key| key.env_var(provider)).collect::<Vec<_>>();
	let noun = if names.len() == 1 { "variable" } else { "variables" };
	let message = format!("Missing {} env {noun}.", names.join(" or "));

	HandlerError::new(HandlerErrorKind::MissingConfiguration, 500, message)
}

/// Builds the 401 error for a token endpoint rejection, carrying the raw payload as data.
pub fn access_token_error(provider: &ProviderId, payload: &ProviderErrorPayload) -> HandlerError {
	let message = format!(
		"{} login failed: {}",
		provider.display_name(),
		payload.reason().unwrap_or(UNKNOWN_REASON)
	);

	HandlerError::new(HandlerErrorKind::ProviderRejection, 401, message)
		.with_data(payload.raw.clone())
}
