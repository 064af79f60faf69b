//! Authorization-code token exchange (RFC 6749 §4.1.3).
//!
//! The provider answers a bad or replayed code with HTTP 401 and an OAuth error body. That
//! response is not a failure of the call: it comes back as [`TokenResponse::Rejected`] so the
//! flow can map it for the user. Every other non-success status, and every transport
//! failure, stays on the error channel.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request, StatusCode, header},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProviderEndpoint, ResponseError},
	http::{self, ProviderHttpClient},
	secret::Secret,
};

/// Grant type sent with every exchange.
pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";

/// Body encodings accepted by [`exchange_code`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestEncoding {
	/// `application/x-www-form-urlencoded`, the encoding RFC 6749 requires.
	#[default]
	Form,
	/// `application/json`, for providers that accept a JSON body instead.
	Json,
}
impl RequestEncoding {
	/// Content type sent with the request.
	pub const fn content_type(self) -> &'static str {
		match self {
			Self::Form => "application/x-www-form-urlencoded",
			Self::Json => "application/json",
		}
	}
}

/// Parameters of an authorization-code exchange.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeRequest<'a> {
	/// OAuth client identifier.
	pub client_id: &'a str,
	/// OAuth client secret.
	pub client_secret: &'a Secret,
	/// Redirect URI used when the code was issued.
	pub redirect_uri: &'a Url,
	/// One-time authorization code.
	pub code: &'a str,
}
impl AuthorizationCodeRequest<'_> {
	/// Body fields in submission order.
	pub fn fields(&self) -> [(&'static str, &str); 5] {
		[
			("grant_type", AUTHORIZATION_CODE_GRANT),
			("client_id", self.client_id),
			("client_secret", self.client_secret.expose()),
			("redirect_uri", self.redirect_uri.as_str()),
			("code", self.code),
		]
	}

	/// Encodes the body for `encoding`.
	pub fn encode(&self, encoding: RequestEncoding) -> Result<Vec<u8>, ConfigError> {
		match encoding {
			RequestEncoding::Form => {
				let mut serializer = form_urlencoded::Serializer::new(String::new());

				serializer.extend_pairs(self.fields());

				Ok(serializer.finish().into_bytes())
			},
			RequestEncoding::Json => {
				let body = self.fields().into_iter().collect::<BTreeMap<_, _>>();

				serde_json::to_vec(&body).map_err(ConfigError::RequestEncoding)
			},
		}
	}
}

/// Tokens returned by a successful exchange.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenSet {
	/// Token type, used as the `Authorization` scheme (`Bearer`).
	pub token_type: String,
	/// Access token.
	pub access_token: Secret,
	/// ID token, when the `openid` scope was granted.
	#[serde(default)]
	pub id_token: Option<Secret>,
	/// Refresh token, when issued.
	#[serde(default)]
	pub refresh_token: Option<Secret>,
	/// Lifetime of the access token in seconds.
	#[serde(default)]
	pub expires_in: Option<u64>,
	/// Remaining provider-specific fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, JsonValue>,
}
impl TokenSet {
	/// `Authorization` header value for resource calls.
	pub fn authorization_header(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}
}

/// OAuth error body returned by the token endpoint (RFC 6749 §5.2).
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderErrorPayload {
	/// OAuth error code (`invalid_grant`, ...).
	pub error: Option<String>,
	/// Human-readable description.
	pub error_description: Option<String>,
	/// Raw body as returned by the provider.
	pub raw: JsonValue,
}
impl ProviderErrorPayload {
	/// Builds a payload from a response body; non-JSON bodies are kept as a JSON string.
	pub fn from_body(body: &[u8]) -> Self {
		let raw = serde_json::from_slice::<JsonValue>(body)
			.unwrap_or_else(|_| JsonValue::String(String::from_utf8_lossy(body).into_owned()));

		Self::from_value(raw)
	}

	/// Builds a payload from an already parsed body.
	pub fn from_value(raw: JsonValue) -> Self {
		let field = |name: &str| {
			raw.get(name).and_then(JsonValue::as_str).filter(|value| !value.is_empty()).map(str::to_owned)
		};

		Self { error: field("error"), error_description: field("error_description"), raw }
	}

	/// Best available explanation: description, then error code.
	pub fn reason(&self) -> Option<&str> {
		self.error_description.as_deref().or(self.error.as_deref())
	}
}

/// Outcome of an exchange that reached the provider.
#[derive(Clone, Debug)]
pub enum TokenResponse {
	/// The provider issued tokens.
	Success(TokenSet),
	/// The provider rejected the code or the client.
	Rejected(ProviderErrorPayload),
}
impl TokenResponse {
	/// Classifies a token endpoint response.
	///
	/// 401 is always a rejection; a success status is a rejection when the body carries an
	/// `error` field; every other status is an unexpected response.
	pub fn from_http(status: StatusCode, body: &[u8]) -> Result<Self, ResponseError> {
		if status == StatusCode::UNAUTHORIZED {
			return Ok(Self::Rejected(ProviderErrorPayload::from_body(body)));
		}
		if !status.is_success() {
			return Err(ResponseError::UnexpectedStatus {
				endpoint: ProviderEndpoint::Token,
				status: status.as_u16(),
				body_preview: http::body_preview(body),
			});
		}

		let de = &mut serde_json::Deserializer::from_slice(body);
		let value: JsonValue = serde_path_to_error::deserialize(de)
			.map_err(|e| ResponseError::Malformed { endpoint: ProviderEndpoint::Token, source: e })?;

		if value.get("error").is_some_and(|error| !error.is_null()) {
			return Ok(Self::Rejected(ProviderErrorPayload::from_value(value)));
		}

		serde_path_to_error::deserialize(value)
			.map(Self::Success)
			.map_err(|e| ResponseError::Malformed { endpoint: ProviderEndpoint::Token, source: e })
	}
}

/// Exchanges an authorization code at `token_endpoint`.
pub async fn exchange_code<C>(
	http_client: &C,
	token_endpoint: &Url,
	request: &AuthorizationCodeRequest<'_>,
	encoding: RequestEncoding,
	timeout: Option<Duration>,
) -> Result<TokenResponse>
where
	C: ?Sized + ProviderHttpClient,
{
	let body = request.encode(encoding)?;
	let request = Request::builder()
		.method(Method::POST)
		.uri(token_endpoint.as_str())
		.header(header::CONTENT_TYPE, encoding.content_type())
		.header(header::ACCEPT, "application/json")
		.body(body)
		.map_err(ConfigError::from)?;
	let handle = http_client.handle(timeout);
	let response = handle.call(request).await.map_err(http::transport_error)?;

	Ok(TokenResponse::from_http(response.status(), response.body())?)
}
