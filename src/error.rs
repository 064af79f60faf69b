//! Flow-level error types shared across discovery, token exchange, and session handling.
//!
//! Only [`HandlerError`] is user-facing: it is the structured error produced by the
//! mapper for missing configuration and provider rejections, and it is either handed to
//! the caller's error handler or raised as [`Error::Handler`]. Every other variant is an
//! unexpected fault that the surrounding framework should turn into a hard failure.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Structured error raised because no error handler was configured.
	#[error(transparent)]
	Handler(#[from] HandlerError),
	/// Local configuration problem that cannot be reported as a missing setting.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Provider metadata could not be discovered.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a status or body the flow does not understand.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Session collaborator refused or failed to persist the record.
	#[error("{0}")]
	Session(
		#[from]
		#[source]
		crate::session::SessionError,
	),
}
impl Error {
	/// HTTP status a framework should answer with when this error reaches its boundary.
	pub fn status(&self) -> u16 {
		match self {
			Self::Handler(err) => err.status,
			Self::Discovery(_) | Self::Transport(_) | Self::Response(_) => 502,
			Self::Config(_) | Self::Session(_) => 500,
		}
	}

	/// Returns the structured handler error, if this is one.
	pub fn as_handler(&self) -> Option<&HandlerError> {
		match self {
			Self::Handler(err) => Some(err),
			_ => None,
		}
	}
}

/// Classification of the errors that the flow maps for the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerErrorKind {
	/// Required provider settings are absent.
	MissingConfiguration,
	/// The provider rejected the authorization code during the token exchange.
	ProviderRejection,
}

/// Structured, user-facing error built by the mapper.
///
/// `data` carries the raw provider payload for rejections so error handlers can inspect
/// the exact `error`/`error_description` pair.
#[derive(Clone, Debug, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct HandlerError {
	/// What went wrong.
	pub kind: HandlerErrorKind,
	/// HTTP status code associated with the error.
	pub status: u16,
	/// Human-readable message.
	pub message: String,
	/// Raw provider payload, when available.
	pub data: Option<JsonValue>,
}
impl HandlerError {
	/// Creates a new error without attached data.
	pub fn new(kind: HandlerErrorKind, status: u16, message: impl Into<String>) -> Self {
		Self { kind, status, message: message.into(), data: None }
	}

	/// Attaches structured data to the error.
	pub fn with_data(mut self, data: JsonValue) -> Self {
		self.data = Some(data);

		self
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI `{value}` is invalid.")]
	InvalidRedirect {
		/// Offending value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token request body could not be encoded.
	#[error("Token request body could not be encoded.")]
	RequestEncoding(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Provider metadata discovery failures.
#[derive(Debug, ThisError)]
pub enum DiscoveryError {
	/// Region or user pool id would produce an unsafe or invalid discovery URL.
	#[error("Cannot derive a discovery URL from region `{region}` and user pool `{user_pool_id}`.")]
	InvalidLocation {
		/// Configured region.
		region: String,
		/// Configured user pool id.
		user_pool_id: String,
	},
	/// The discovery request failed at the transport layer.
	#[error("Discovery request failed.")]
	Transport(#[source] TransportError),
	/// The discovery endpoint answered with a non-success status.
	#[error("Discovery endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
	/// The discovery document is not valid JSON or misses required fields.
	#[error("Discovery document is malformed.")]
	Malformed(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// An endpoint advertised by the document is not a valid URL.
	#[error("Discovery document advertises an invalid {field}.")]
	InvalidEndpoint {
		/// Document field name.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The document was issued for a different user pool.
	#[error("Discovery document issuer `{actual}` does not match `{expected}`.")]
	IssuerMismatch {
		/// Issuer derived from the configuration.
		expected: String,
		/// Issuer advertised by the document.
		actual: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// The HTTP client reported a failure without a typed source.
	#[error("HTTP client error occurred while calling the provider: {message}.")]
	Other {
		/// Client-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Provider endpoints that return JSON documents to the flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderEndpoint {
	/// Token endpoint.
	Token,
	/// Userinfo endpoint.
	UserInfo,
}
impl ProviderEndpoint {
	/// Returns a stable label for messages and telemetry.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Token => "token",
			Self::UserInfo => "userinfo",
		}
	}
}
impl Display for ProviderEndpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Unexpected provider responses.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// The endpoint answered with a status the flow does not map.
	#[error("The {endpoint} endpoint returned HTTP {status}.")]
	UnexpectedStatus {
		/// Endpoint that answered.
		endpoint: ProviderEndpoint,
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// The endpoint answered with a body the flow cannot parse.
	#[error("The {endpoint} endpoint returned a malformed body.")]
	Malformed {
		/// Endpoint that answered.
		endpoint: ProviderEndpoint,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
