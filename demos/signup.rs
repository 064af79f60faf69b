//! Resolves a Cognito configuration and prints where the sign-up and login flows would send a
//! user, using hand-written provider metadata in place of discovery.

// crates.io
use color_eyre::Result;
// self
use cognito_signup::{
	config::{self, EnvOverrides, ProviderConfig, ProviderSettings},
	flows::mapper,
	oauth,
	provider::{DiscoveryBase, ProviderId, ProviderMetadata},
	url::Url,
};

fn main() -> Result<()> {
	color_eyre::install()?;

	let provider = ProviderId::cognito();
	let overrides = EnvOverrides::from_env(&provider);
	let settings = ProviderSettings {
		client_id: Some("demo-client".into()),
		client_secret: Some("demo-secret".into()),
		user_pool_id: Some("us-east-1_DemoPool".into()),
		region: Some("us-east-1".into()),
		..Default::default()
	};
	let config = ProviderConfig::resolve(&overrides, Some(settings));

	if let Err(missing) = config.validate() {
		eprintln!("{}", mapper::missing_configuration(&provider, &missing).message);

		return Ok(());
	}

	let base = DiscoveryBase::Regional;
	let issuer = base.issuer(&config.region, &config.user_pool_id)?;
	let discovery_url = base.discovery_url(&config.region, &config.user_pool_id)?;

	println!("Discovery document for {issuer} lives at {discovery_url}.");

	let domain = Url::parse("https://demo.auth.us-east-1.amazoncognito.com")?;
	let metadata = ProviderMetadata {
		issuer,
		authorization_endpoint: domain.join("oauth2/authorize")?,
		token_endpoint: domain.join("oauth2/token")?,
		userinfo_endpoint: domain.join("oauth2/userInfo")?,
		end_session_endpoint: Some(domain.join("logout")?),
	};
	let request_url = Url::parse("https://app.example.com/auth/signup?state=ignored")?;
	let redirect_uri = config::resolve_redirect_uri(&overrides, &config, &request_url)?;

	println!("Send new users to {}.", oauth::build_signup_url(&metadata, &config, &redirect_uri)?);
	println!(
		"Send returning users to {}.",
		oauth::build_login_url(&metadata, &config, &redirect_uri)
	);

	let incomplete = ProviderConfig::resolve(&EnvOverrides::default(), None);

	if let Err(missing) = incomplete.validate() {
		println!(
			"An empty configuration fails with: {}",
			mapper::missing_configuration(&provider, &missing).message
		);
	}

	Ok(())
}
