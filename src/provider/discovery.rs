//! OpenID Connect discovery for Cognito user pools.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{Method, Request, header},
};
// self
use crate::{
	_prelude::*,
	config::ProviderConfig,
	error::DiscoveryError,
	http::{self, ProviderHttpClient},
};

/// Path appended to the issuer to reach the discovery document.
pub const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

/// Where issuers live.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DiscoveryBase {
	/// The regional Cognito host, `https://cognito-idp.{region}.amazonaws.com`.
	#[default]
	Regional,
	/// A fixed host standing in for Cognito (emulators, tests). The user pool id is appended.
	Custom(Url),
}
impl DiscoveryBase {
	/// Derives the issuer identifier for a user pool.
	pub fn issuer(&self, region: &str, user_pool_id: &str) -> Result<String, DiscoveryError> {
		let invalid = || DiscoveryError::InvalidLocation {
			region: region.to_owned(),
			user_pool_id: user_pool_id.to_owned(),
		};

		if !is_valid_pool_id(user_pool_id) {
			return Err(invalid());
		}

		match self {
			Self::Regional => {
				if !is_valid_region(region) {
					return Err(invalid());
				}

				Ok(format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}"))
			},
			Self::Custom(base) => Ok(format!("{}/{user_pool_id}", base.as_str().trim_end_matches('/'))),
		}
	}

	/// Derives the discovery document URL for a user pool.
	pub fn discovery_url(&self, region: &str, user_pool_id: &str) -> Result<Url, DiscoveryError> {
		let issuer = self.issuer(region, user_pool_id)?;

		Url::parse(&format!("{issuer}/{WELL_KNOWN_PATH}"))
			.map_err(|source| DiscoveryError::InvalidEndpoint { field: "issuer", source })
	}
}

/// Endpoints advertised by a provider, immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMetadata {
	/// Issuer identifier.
	pub issuer: String,
	/// Authorization endpoint (hosted login page).
	pub authorization_endpoint: Url,
	/// Token endpoint.
	pub token_endpoint: Url,
	/// Userinfo endpoint.
	pub userinfo_endpoint: Url,
	/// End-session (logout) endpoint, when advertised.
	pub end_session_endpoint: Option<Url>,
}
impl ProviderMetadata {
	/// Parses and validates a discovery document body.
	pub fn from_document(body: &[u8], expected_issuer: &str) -> Result<Self, DiscoveryError> {
		let de = &mut serde_json::Deserializer::from_slice(body);
		let document: DiscoveryDocument =
			serde_path_to_error::deserialize(de).map_err(DiscoveryError::Malformed)?;

		if document.issuer.trim_end_matches('/') != expected_issuer.trim_end_matches('/') {
			return Err(DiscoveryError::IssuerMismatch {
				expected: expected_issuer.to_owned(),
				actual: document.issuer,
			});
		}

		Ok(Self {
			authorization_endpoint: parse_endpoint(
				"authorization_endpoint",
				&document.authorization_endpoint,
			)?,
			token_endpoint: parse_endpoint("token_endpoint", &document.token_endpoint)?,
			userinfo_endpoint: parse_endpoint("userinfo_endpoint", &document.userinfo_endpoint)?,
			end_session_endpoint: document
				.end_session_endpoint
				.as_deref()
				.map(|raw| parse_endpoint("end_session_endpoint", raw))
				.transpose()?,
			issuer: document.issuer,
		})
	}
}

#[derive(Deserialize)]
struct DiscoveryDocument {
	issuer: String,
	authorization_endpoint: String,
	token_endpoint: String,
	userinfo_endpoint: String,
	#[serde(default)]
	end_session_endpoint: Option<String>,
}

/// Fetches the discovery document for the configured user pool.
///
/// The client credentials are not sent; they only identify which configuration the
/// metadata belongs to when callers cache it.
pub async fn discover<C>(
	http_client: &C,
	base: &DiscoveryBase,
	config: &ProviderConfig,
	timeout: Option<Duration>,
) -> Result<ProviderMetadata, DiscoveryError>
where
	C: ?Sized + ProviderHttpClient,
{
	let issuer = base.issuer(&config.region, &config.user_pool_id)?;
	let url = base.discovery_url(&config.region, &config.user_pool_id)?;
	let request = Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(header::ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(|e| DiscoveryError::Transport(crate::error::TransportError::network(e)))?;
	let handle = http_client.handle(timeout);
	let response = handle
		.call(request)
		.await
		.map_err(|e| DiscoveryError::Transport(http::transport_error(e)))?;
	let status = response.status();

	if !status.is_success() {
		return Err(DiscoveryError::UnexpectedStatus { status: status.as_u16() });
	}

	ProviderMetadata::from_document(response.body(), &issuer)
}

fn parse_endpoint(field: &'static str, raw: &str) -> Result<Url, DiscoveryError> {
	Url::parse(raw).map_err(|source| DiscoveryError::InvalidEndpoint { field, source })
}

fn is_valid_region(region: &str) -> bool {
	!region.is_empty() && region.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_valid_pool_id(user_pool_id: &str) -> bool {
	!user_pool_id.is_empty()
		&& user_pool_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const ISSUER: &str = "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_Pool";

	fn document(issuer: &str) -> Vec<u8> {
		serde_json::to_vec(&serde_json::json!({
			"issuer": issuer,
			"authorization_endpoint": "https://auth.example.com/oauth2/authorize",
			"token_endpoint": "https://auth.example.com/oauth2/token",
			"userinfo_endpoint": "https://auth.example.com/oauth2/userInfo",
			"jwks_uri": "https://auth.example.com/.well-known/jwks.json"
		}))
		.expect("Discovery fixture should serialize.")
	}

	#[test]
	fn regional_discovery_url_follows_cognito_layout() {
		let url = DiscoveryBase::Regional
			.discovery_url("us-east-1", "us-east-1_Pool")
			.expect("Regional discovery URL should build.");

		assert_eq!(url.as_str(), format!("{ISSUER}/.well-known/openid-configuration"));
	}

	#[test]
	fn custom_base_replaces_the_regional_host() {
		let base = DiscoveryBase::Custom(
			Url::parse("http://127.0.0.1:9000/").expect("Base fixture should parse."),
		);

		assert_eq!(
			base.issuer("ignored", "pool_1").expect("Custom issuer should build."),
			"http://127.0.0.1:9000/pool_1"
		);
	}

	#[test]
	fn location_is_validated_before_interpolation() {
		assert!(matches!(
			DiscoveryBase::Regional.issuer("us-east-1.evil.com/x", "pool"),
			Err(DiscoveryError::InvalidLocation { .. })
		));
		assert!(matches!(
			DiscoveryBase::Regional.issuer("us-east-1", "../pool"),
			Err(DiscoveryError::InvalidLocation { .. })
		));
	}

	#[test]
	fn document_parsing_extracts_endpoints() {
		let metadata = ProviderMetadata::from_document(&document(ISSUER), ISSUER)
			.expect("Discovery document should parse.");

		assert_eq!(
			metadata.authorization_endpoint.as_str(),
			"https://auth.example.com/oauth2/authorize"
		);
		assert_eq!(metadata.userinfo_endpoint.path(), "/oauth2/userInfo");
		assert!(metadata.end_session_endpoint.is_none());
	}

	#[test]
	fn document_parsing_rejects_foreign_issuers_and_missing_fields() {
		let err = ProviderMetadata::from_document(&document("https://other.example.com"), ISSUER)
			.expect_err("Foreign issuers must be rejected.");

		assert!(matches!(err, DiscoveryError::IssuerMismatch { .. }));

		let err = ProviderMetadata::from_document(b"{\"issuer\":\"x\"}", "x")
			.expect_err("Documents without endpoints must be rejected.");

		match err {
			DiscoveryError::Malformed(source) =>
				assert!(source.inner().to_string().contains("authorization_endpoint")),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
