//! Sign-up flow orchestration.
//!
//! [`SignupFlow`] owns the HTTP client, the error policy, and the knobs that shape every
//! request (timeouts, discovery location, cache, overrides). The runtime configuration and
//! session collaborators are passed to [`SignupFlow::handle`] per request. The same state
//! machine also serves the hosted login page when built with [`FlowMode::Login`].

pub mod mapper;

mod signup;

pub use mapper::*;

// self
use crate::{
	_prelude::*,
	config::EnvOverrides,
	http::ProviderHttpClient,
	oauth::RequestEncoding,
	provider::{DiscoveryBase, DiscoveryCache, ProviderId},
	session::DEFAULT_SESSION_LIMIT,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Location users are sent to once their session is established.
pub const HOME_LOCATION: &str = "/";
/// Query parameter carrying the authorization code.
pub const CODE_PARAM: &str = "code";

#[cfg(feature = "reqwest")]
/// Flow specialized for the crate's default reqwest transport.
pub type ReqwestSignupFlow = SignupFlow<ReqwestHttpClient>;

/// Which hosted page the flow sends users to and which session it writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowMode {
	/// Hosted sign-up page; the session keeps the access token.
	#[default]
	Signup,
	/// Hosted login page; the session records `email_verified` and the login time.
	Login,
}

/// Per-call timeouts for provider requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
	/// Discovery document fetch.
	pub discovery: Duration,
	/// Authorization-code exchange.
	pub token: Duration,
	/// Userinfo fetch.
	pub userinfo: Duration,
}
impl Default for Timeouts {
	fn default() -> Self {
		Self {
			discovery: Duration::seconds(5),
			token: Duration::seconds(5),
			userinfo: Duration::seconds(5),
		}
	}
}

/// Inbound request as seen by the flow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupRequest {
	/// Full request URL, including the query string.
	pub url: Url,
}
impl SignupRequest {
	/// Wraps the inbound request URL.
	pub fn new(url: Url) -> Self {
		Self { url }
	}

	/// Parses the inbound request URL.
	pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
		Url::parse(raw).map(Self::new)
	}

	/// Authorization code from the query string; empty values count as absent.
	pub fn code(&self) -> Option<String> {
		self.url
			.query_pairs()
			.find(|(key, _)| key == CODE_PARAM)
			.map(|(_, value)| value.into_owned())
			.filter(|value| !value.is_empty())
	}
}

/// Response the surrounding framework should send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlowResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Location` header value.
	pub location: String,
}
impl FlowResponse {
	/// 302 redirect to `location`.
	pub fn redirect(location: impl Into<String>) -> Self {
		Self { status: 302, location: location.into() }
	}

	/// 302 redirect to the home location.
	pub fn home() -> Self {
		Self::redirect(HOME_LOCATION)
	}
}

/// Coordinates the sign-up flow against one Cognito-compatible provider.
#[derive(Clone)]
pub struct SignupFlow<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Provider whose settings and environment variables are used.
	pub provider: ProviderId,
	/// Sign-up or login.
	pub mode: FlowMode,
	/// What to do with structured errors.
	pub error_policy: ErrorPolicy,
	/// Per-call timeouts.
	pub timeouts: Timeouts,
	/// Where the discovery document is fetched from.
	pub discovery_base: DiscoveryBase,
	/// Optional metadata cache shared across requests.
	pub discovery_cache: Option<Arc<DiscoveryCache>>,
	/// Environment-derived overrides.
	pub overrides: EnvOverrides,
	/// Token request body encoding.
	pub encoding: RequestEncoding,
	/// Location users land on once the session is written.
	pub home_location: String,
	/// Ceiling for serialized session records, in bytes.
	pub session_limit: usize,
}
impl<C> SignupFlow<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a flow that reuses the caller-provided transport.
	pub fn with_http_client(provider: ProviderId, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			provider,
			mode: FlowMode::default(),
			error_policy: ErrorPolicy::default(),
			timeouts: Timeouts::default(),
			discovery_base: DiscoveryBase::default(),
			discovery_cache: None,
			overrides: EnvOverrides::default(),
			encoding: RequestEncoding::default(),
			home_location: HOME_LOCATION.into(),
			session_limit: DEFAULT_SESSION_LIMIT,
		}
	}

	/// Sets the flow mode.
	pub fn with_mode(mut self, mode: FlowMode) -> Self {
		self.mode = mode;

		self
	}

	/// Sets the error policy.
	pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
		self.error_policy = policy;

		self
	}

	/// Sets the per-call timeouts.
	pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
		self.timeouts = timeouts;

		self
	}

	/// Points discovery at a custom base instead of the regional Cognito host.
	pub fn with_discovery_base(mut self, base: DiscoveryBase) -> Self {
		self.discovery_base = base;

		self
	}

	/// Enables metadata caching through `cache`.
	pub fn with_discovery_cache(mut self, cache: impl Into<Arc<DiscoveryCache>>) -> Self {
		self.discovery_cache = Some(cache.into());

		self
	}

	/// Replaces the environment-derived overrides.
	pub fn with_overrides(mut self, overrides: EnvOverrides) -> Self {
		self.overrides = overrides;

		self
	}

	/// Loads the overrides from the process environment.
	pub fn with_env_overrides(mut self) -> Self {
		self.overrides = EnvOverrides::from_env(&self.provider);

		self
	}

	/// Sets the token request body encoding.
	pub fn with_encoding(mut self, encoding: RequestEncoding) -> Self {
		self.encoding = encoding;

		self
	}

	/// Sets where users land once the session is written.
	pub fn with_home_location(mut self, location: impl Into<String>) -> Self {
		self.home_location = location.into();

		self
	}

	/// Sets the session size ceiling.
	pub fn with_session_limit(mut self, limit: usize) -> Self {
		self.session_limit = limit;

		self
	}
}
#[cfg(feature = "reqwest")]
impl SignupFlow<ReqwestHttpClient> {
	/// Creates a flow for `provider` backed by a reqwest client that never follows redirects.
	pub fn new(provider: ProviderId) -> Result<Self> {
		Ok(Self::with_http_client(provider, ReqwestHttpClient::new()?))
	}
}
impl<C> Debug for SignupFlow<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignupFlow")
			.field("provider", &self.provider)
			.field("mode", &self.mode)
			.field("error_policy", &self.error_policy)
			.field("timeouts", &self.timeouts)
			.field("discovery_base", &self.discovery_base)
			.field("discovery_cache", &self.discovery_cache.is_some())
			.field("encoding", &self.encoding)
			.field("home_location", &self.home_location)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn empty_codes_count_as_absent() {
		let parse = |raw: &str| SignupRequest::parse(raw).expect("Request fixture should parse.");

		assert_eq!(parse("https://app.example.com/auth/signup?code=abc").code().as_deref(), Some("abc"));
		assert_eq!(parse("https://app.example.com/auth/signup?code=").code(), None);
		assert_eq!(parse("https://app.example.com/auth/signup?state=1").code(), None);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn flows_default_to_signup() {
		let flow = SignupFlow::new(ProviderId::cognito()).expect("Default flow should build.");

		assert_eq!(flow.mode, FlowMode::Signup);
		assert_eq!(flow.with_mode(FlowMode::Login).mode, FlowMode::Login);
	}

	#[test]
	fn default_timeouts_are_five_seconds() {
		let timeouts = Timeouts::default();

		assert_eq!(timeouts.discovery, Duration::seconds(5));
		assert_eq!(timeouts.token, Duration::seconds(5));
		assert_eq!(timeouts.userinfo, Duration::seconds(5));
	}
}
