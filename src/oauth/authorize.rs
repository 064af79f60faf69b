//! Sign-up and login redirect construction.

// self
use crate::{_prelude::*, config::ProviderConfig, error::DiscoveryError, provider::ProviderMetadata};

/// Path segment of the hosted login page.
pub const AUTHORIZE_SEGMENT: &str = "oauth2/authorize";
/// Path segment of the hosted sign-up page.
pub const SIGNUP_SEGMENT: &str = "signup";

/// Returns the sign-up endpoint: the authorization endpoint with `oauth2/authorize` swapped
/// for `signup`. The host and query contract stay the same.
pub fn signup_endpoint(metadata: &ProviderMetadata) -> Result<Url, DiscoveryError> {
	let raw = metadata.authorization_endpoint.as_str().replacen(AUTHORIZE_SEGMENT, SIGNUP_SEGMENT, 1);

	Url::parse(&raw)
		.map_err(|source| DiscoveryError::InvalidEndpoint { field: "authorization_endpoint", source })
}

/// Query parameters sent to the sign-up page.
///
/// `client_id`, `redirect_uri`, `response_type=code`, and `scope` are always present;
/// configured authorization parameters are merged last and win on key collisions.
pub fn signup_params(config: &ProviderConfig, redirect_uri: &Url) -> BTreeMap<String, String> {
	let mut params = BTreeMap::new();

	params.insert("client_id".to_owned(), config.client_id.clone());
	params.insert("redirect_uri".to_owned(), redirect_uri.as_str().to_owned());
	params.insert("response_type".to_owned(), "code".to_owned());
	params.insert("scope".to_owned(), config.effective_scope().join(" "));

	for (key, value) in &config.authorization_params {
		params.insert(key.clone(), value.clone());
	}

	params
}

/// Builds the full sign-up URL users are redirected to.
pub fn build_signup_url(
	metadata: &ProviderMetadata,
	config: &ProviderConfig,
	redirect_uri: &Url,
) -> Result<Url, DiscoveryError> {
	Ok(with_params(signup_endpoint(metadata)?, signup_params(config, redirect_uri)))
}

/// Builds the hosted login URL: the authorization endpoint as discovered, with the same
/// parameters as the sign-up page.
pub fn build_login_url(
	metadata: &ProviderMetadata,
	config: &ProviderConfig,
	redirect_uri: &Url,
) -> Url {
	with_params(metadata.authorization_endpoint.clone(), signup_params(config, redirect_uri))
}

// Each key appears once; `params` replace pairs already present on the endpoint.
fn with_params(mut url: Url, params: BTreeMap<String, String>) -> Url {
	let mut merged = url.query_pairs().into_owned().collect::<BTreeMap<_, _>>();

	merged.extend(params);
	url.query_pairs_mut().clear().extend_pairs(&merged);

	url
}
