//! OpenID Connect userinfo fetch.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request, header},
};
use serde::Deserializer;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ProviderEndpoint, ResponseError},
	http::{self, ProviderHttpClient},
	oauth::TokenSet,
};

/// Claims returned by the userinfo endpoint.
///
/// The flows only read `preferred_username`, `email`, and `email_verified`; everything else
/// stays in `claims` and is never copied into the session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserProfile {
	/// Subject identifier.
	#[serde(default)]
	pub sub: Option<String>,
	/// Username chosen at sign-up.
	#[serde(default)]
	pub preferred_username: Option<String>,
	/// Email address.
	#[serde(default)]
	pub email: Option<String>,
	/// Whether the email address was verified. Cognito sends `"true"`/`"false"` strings.
	#[serde(default, deserialize_with = "lenient_bool")]
	pub email_verified: Option<bool>,
	/// Remaining claims.
	#[serde(flatten)]
	pub claims: BTreeMap<String, JsonValue>,
}
impl UserProfile {
	/// Parses a userinfo response body.
	pub fn from_body(body: &[u8]) -> Result<Self, ResponseError> {
		let de = &mut serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(de)
			.map_err(|e| ResponseError::Malformed { endpoint: ProviderEndpoint::UserInfo, source: e })
	}
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Flag {
		Bool(bool),
		Text(String),
	}

	Ok(match Option::<Flag>::deserialize(deserializer)? {
		Some(Flag::Bool(value)) => Some(value),
		Some(Flag::Text(text)) => text.parse().ok(),
		None => None,
	})
}

/// Fetches the profile of the user `tokens` were issued to.
pub async fn fetch_user_info<C>(
	http_client: &C,
	userinfo_endpoint: &Url,
	tokens: &TokenSet,
	timeout: Option<Duration>,
) -> Result<UserProfile>
where
	C: ?Sized + ProviderHttpClient,
{
	let request = Request::builder()
		.method(Method::GET)
		.uri(userinfo_endpoint.as_str())
		.header(header::AUTHORIZATION, tokens.authorization_header())
		.header(header::ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(ConfigError::from)?;
	let handle = http_client.handle(timeout);
	let response = handle.call(request).await.map_err(http::transport_error)?;
	let status = response.status();

	if !status.is_success() {
		return Err(ResponseError::UnexpectedStatus {
			endpoint: ProviderEndpoint::UserInfo,
			status: status.as_u16(),
			body_preview: http::body_preview(response.body()),
		}
		.into());
	}

	Ok(UserProfile::from_body(response.body())?)
}
