//! Optional observability helpers for the sign-up flow.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `cognito_signup.flow` with the `provider` and
//!   `stage` fields, and `warn` events for errors handled by the error policy.
//! - Enable `metrics` to increment the `cognito_signup_flow_total` counter for every stage
//!   attempt/success/failure, labeled by `stage` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Stages of a sign-up or login request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Configuration merge and validation.
	Configuration,
	/// Provider metadata discovery.
	Discovery,
	/// Redirect to the hosted sign-up page.
	SignupRedirect,
	/// Redirect to the hosted login page.
	LoginRedirect,
	/// Authorization-code exchange.
	TokenExchange,
	/// Userinfo fetch.
	UserInfo,
	/// Session hand-off.
	Session,
}
impl FlowStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::Configuration => "configuration",
			FlowStage::Discovery => "discovery",
			FlowStage::SignupRedirect => "signup_redirect",
			FlowStage::LoginRedirect => "login_redirect",
			FlowStage::TokenExchange => "token_exchange",
			FlowStage::UserInfo => "userinfo",
			FlowStage::Session => "session",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Structured error routed through the error policy.
	Handled,
	/// Fault propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Handled => "handled",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
