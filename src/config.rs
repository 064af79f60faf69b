//! Provider configuration resolution.
//!
//! Three sources feed a [`ProviderConfig`]: environment overrides ([`EnvOverrides`]), the
//! runtime configuration collaborator ([`RuntimeConfig`]), and built-in defaults. Resolution
//! never fails; [`ProviderConfig::validate`] reports missing settings separately so the flow
//! can map them into a structured error.
//!
//! Environment variable names follow `OAUTH_{PROVIDER}_{FIELD}`, where `FIELD` is the
//! upper snake case form of the camelCase setting name (see [`env_var_name`]).

pub mod scope;

pub use scope::*;

// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderId, secret::Secret};

/// Prefix shared by every environment variable the crate reads.
pub const ENV_PREFIX: &str = "OAUTH";

/// Setting name of the comma-separated scope override.
pub const SCOPE_SETTING: &str = "scope";
/// Setting name of the sign-up redirect URL override.
pub const SIGNUP_REDIRECT_SETTING: &str = "signupRedirectURL";

/// Settings that must be present before the flow talks to the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigKey {
	/// OAuth client identifier.
	ClientId,
	/// OAuth client secret.
	ClientSecret,
	/// Cognito user pool identifier.
	UserPoolId,
	/// AWS region hosting the user pool.
	Region,
}
impl ConfigKey {
	/// Every required key, in reporting order.
	pub const ALL: [ConfigKey; 4] =
		[ConfigKey::ClientId, ConfigKey::ClientSecret, ConfigKey::UserPoolId, ConfigKey::Region];

	/// camelCase setting name, as used by runtime configuration documents.
	pub const fn field_name(self) -> &'static str {
		match self {
			Self::ClientId => "clientId",
			Self::ClientSecret => "clientSecret",
			Self::UserPoolId => "userPoolId",
			Self::Region => "region",
		}
	}

	/// Environment variable that supplies this key for `provider`.
	pub fn env_var(self, provider: &ProviderId) -> String {
		env_var_name(provider, self.field_name())
	}
}
impl Display for ConfigKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.field_name())
	}
}

/// Runtime provider settings as loaded by the surrounding application.
///
/// Every field is optional so partially filled documents still deserialize; completeness is
/// checked after resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderSettings {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// OAuth client secret.
	pub client_secret: Option<Secret>,
	/// Cognito user pool identifier.
	pub user_pool_id: Option<String>,
	/// AWS region hosting the user pool.
	pub region: Option<String>,
	/// Requested scopes.
	pub scope: Option<ScopeList>,
	/// Extra authorization query parameters; they win over built-in parameters.
	pub authorization_params: Option<BTreeMap<String, String>>,
	/// Redirect URI registered with the provider.
	#[serde(rename = "redirectURL", alias = "redirectUrl")]
	pub redirect_url: Option<String>,
}
impl ProviderSettings {
	/// Loads settings from the process environment.
	pub fn from_env(provider: &ProviderId) -> Self {
		Self::from_lookup(provider, |name| std::env::var(name).ok())
	}

	/// Loads settings through an arbitrary variable lookup.
	///
	/// Reads `clientId`, `clientSecret`, `userPoolId`, `region`, and `redirectURL`. Scopes
	/// come from [`EnvOverrides`] instead.
	pub fn from_lookup<F>(provider: &ProviderId, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let read = |field: &str| lookup(&env_var_name(provider, field)).filter(|v| !v.is_empty());

		Self {
			client_id: read(ConfigKey::ClientId.field_name()),
			client_secret: read(ConfigKey::ClientSecret.field_name()).map(Secret::from),
			user_pool_id: read(ConfigKey::UserPoolId.field_name()),
			region: read(ConfigKey::Region.field_name()),
			scope: None,
			authorization_params: None,
			redirect_url: read("redirectURL"),
		}
	}
}

/// The "read runtime configuration" collaborator.
pub trait RuntimeConfig
where
	Self: Send + Sync,
{
	/// Returns the settings configured for `provider`, if any.
	fn provider_settings(&self, provider: &ProviderId) -> Option<ProviderSettings>;
}
impl RuntimeConfig for ProviderSettings {
	fn provider_settings(&self, _provider: &ProviderId) -> Option<ProviderSettings> {
		Some(self.clone())
	}
}
impl RuntimeConfig for HashMap<ProviderId, ProviderSettings> {
	fn provider_settings(&self, provider: &ProviderId) -> Option<ProviderSettings> {
		self.get(provider).cloned()
	}
}

/// Values read from the environment that take precedence over runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvOverrides {
	/// Scope override (`OAUTH_{PROVIDER}_SCOPE`, comma-separated).
	pub scope: Option<ScopeList>,
	/// Sign-up redirect URL override (`OAUTH_{PROVIDER}_SIGNUP_REDIRECT_URL`); login flows
	/// ignore it.
	pub redirect_url: Option<String>,
}
impl EnvOverrides {
	/// Reads overrides from the process environment.
	pub fn from_env(provider: &ProviderId) -> Self {
		Self::from_lookup(provider, |name| std::env::var(name).ok())
	}

	/// Reads overrides through an arbitrary variable lookup.
	pub fn from_lookup<F>(provider: &ProviderId, lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		let scope = lookup(&env_var_name(provider, SCOPE_SETTING))
			.map(|raw| ScopeList::from_delimited(&raw, ','))
			.filter(|scope| !scope.is_empty());
		let redirect_url = lookup(&env_var_name(provider, SIGNUP_REDIRECT_SETTING))
			.map(|raw| raw.trim().to_owned())
			.filter(|raw| !raw.is_empty());

		Self { scope, redirect_url }
	}
}

/// Fully merged provider configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderConfig {
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: Secret,
	/// Cognito user pool identifier.
	pub user_pool_id: String,
	/// AWS region hosting the user pool.
	pub region: String,
	/// Requested scopes; empty means "use the sign-up default".
	pub scope: ScopeList,
	/// Extra authorization query parameters.
	pub authorization_params: BTreeMap<String, String>,
	/// Configured redirect URI.
	pub redirect_url: Option<String>,
}
impl ProviderConfig {
	/// Merges overrides, runtime settings, and defaults. Never fails.
	pub fn resolve(overrides: &EnvOverrides, settings: Option<ProviderSettings>) -> Self {
		let settings = settings.unwrap_or_default();
		let scope = match &overrides.scope {
			Some(scope) if !scope.is_empty() => scope.clone(),
			_ => settings.scope.unwrap_or_default(),
		};

		Self {
			client_id: settings.client_id.unwrap_or_default(),
			client_secret: settings.client_secret.unwrap_or_default(),
			user_pool_id: settings.user_pool_id.unwrap_or_default(),
			region: settings.region.unwrap_or_default(),
			scope,
			authorization_params: settings.authorization_params.unwrap_or_default(),
			redirect_url: settings.redirect_url.filter(|url| !url.trim().is_empty()),
		}
	}

	/// Returns the required keys that are empty, or `Ok(())` when the config is complete.
	pub fn validate(&self) -> Result<(), Vec<ConfigKey>> {
		let missing = ConfigKey::ALL
			.into_iter()
			.filter(|key| match key {
				ConfigKey::ClientId => self.client_id.trim().is_empty(),
				ConfigKey::ClientSecret => self.client_secret.is_blank(),
				ConfigKey::UserPoolId => self.user_pool_id.trim().is_empty(),
				ConfigKey::Region => self.region.trim().is_empty(),
			})
			.collect::<Vec<_>>();

		if missing.is_empty() { Ok(()) } else { Err(missing) }
	}

	/// Scopes to request: the configured list, or `openid profile` when none is configured.
	pub fn effective_scope(&self) -> ScopeList {
		if self.scope.is_empty() { ScopeList::signup_default() } else { self.scope.clone() }
	}
}

/// Picks the redirect URI for the provider round trip.
///
/// Precedence: environment override, configured `redirect_url`, then the inbound request URL
/// stripped of its query string and fragment.
pub fn resolve_redirect_uri(
	overrides: &EnvOverrides,
	config: &ProviderConfig,
	request_url: &Url,
) -> Result<Url, ConfigError> {
	let configured = overrides.redirect_url.as_deref().or(config.redirect_url.as_deref());

	if let Some(value) = configured {
		return Url::parse(value)
			.map_err(|source| ConfigError::InvalidRedirect { value: value.to_owned(), source });
	}

	let mut url = request_url.clone();

	url.set_query(None);
	url.set_fragment(None);

	Ok(url)
}

/// Builds the environment variable name for a setting of `provider`.
///
/// `env_var_name(cognito, "userPoolId")` yields `OAUTH_COGNITO_USER_POOL_ID`.
pub fn env_var_name(provider: &ProviderId, field: &str) -> String {
	format!("{ENV_PREFIX}_{}_{}", provider.env_segment(), snake_case(field).to_ascii_uppercase())
}

/// Converts a camelCase (or PascalCase) name into snake_case, keeping acronyms together.
pub(crate) fn snake_case(name: &str) -> String {
	let chars = name.chars().collect::<Vec<_>>();
	let mut buf = String::with_capacity(name.len() + 4);

	for (idx, ch) in chars.iter().copied().enumerate() {
		if ch == '-' || ch == ' ' {
			buf.push('_');

			continue;
		}
		if ch.is_uppercase() && idx > 0 {
			let prev = chars[idx - 1];
			let next_is_lower = chars.get(idx + 1).is_some_and(|next| next.is_lowercase());

			if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
			{
				buf.push('_');
			}
		}

		buf.extend(ch.to_lowercase());
	}

	buf
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn complete_settings() -> ProviderSettings {
		ProviderSettings {
			client_id: Some("client".into()),
			client_secret: Some("secret".into()),
			user_pool_id: Some("us-east-1_pool".into()),
			region: Some("us-east-1".into()),
			..Default::default()
		}
	}

	#[test]
	fn snake_case_handles_camel_case_and_acronyms() {
		assert_eq!(snake_case("clientId"), "client_id");
		assert_eq!(snake_case("userPoolId"), "user_pool_id");
		assert_eq!(snake_case("region"), "region");
		assert_eq!(snake_case("redirectURL"), "redirect_url");
		assert_eq!(snake_case("signupRedirectURL"), "signup_redirect_url");
		assert_eq!(snake_case("URLValue"), "url_value");
	}

	#[test]
	fn env_var_names_are_derived_from_field_names() {
		let provider = ProviderId::cognito();

		assert_eq!(ConfigKey::ClientSecret.env_var(&provider), "OAUTH_COGNITO_CLIENT_SECRET");
		assert_eq!(ConfigKey::UserPoolId.env_var(&provider), "OAUTH_COGNITO_USER_POOL_ID");
		assert_eq!(
			env_var_name(&provider, SIGNUP_REDIRECT_SETTING),
			"OAUTH_COGNITO_SIGNUP_REDIRECT_URL"
		);
	}

	#[test]
	fn resolve_applies_defaults() {
		let config = ProviderConfig::resolve(&EnvOverrides::default(), None);

		assert!(config.scope.is_empty());
		assert!(config.authorization_params.is_empty());
		assert_eq!(config.validate(), Err(ConfigKey::ALL.to_vec()));
		assert_eq!(config.effective_scope().join(" "), "openid profile");
	}

	#[test]
	fn env_scope_overrides_runtime_scope() {
		let settings = ProviderSettings {
			scope: Some(ScopeList::new(["openid"]).expect("Scope fixture should be valid.")),
			..complete_settings()
		};
		let overrides = EnvOverrides::from_lookup(&ProviderId::cognito(), |name| {
			(name == "OAUTH_COGNITO_SCOPE").then(|| "openid,email,phone".to_owned())
		});
		let config = ProviderConfig::resolve(&overrides, Some(settings.clone()));

		assert_eq!(config.scope.join(" "), "openid email phone");
		assert_eq!(config.validate(), Ok(()));

		let blank = EnvOverrides::from_lookup(&ProviderId::cognito(), |_| Some(" , ".into()));
		let config = ProviderConfig::resolve(&blank, Some(settings));

		assert_eq!(config.scope.join(" "), "openid");
	}

	#[test]
	fn validate_reports_only_missing_keys() {
		let settings = ProviderSettings { region: Some(" ".into()), ..complete_settings() };
		let config = ProviderConfig::resolve(&EnvOverrides::default(), Some(settings));

		assert_eq!(config.validate(), Err(vec![ConfigKey::Region]));
	}

	#[test]
	fn settings_deserialize_from_camel_case_documents() {
		let settings: ProviderSettings = serde_json::from_value(serde_json::json!({
			"clientId": "client",
			"clientSecret": "secret",
			"userPoolId": "pool",
			"region": "eu-west-1",
			"authorizationParams": { "lang": "fr" },
			"redirectURL": "https://app.example.com/auth/signup"
		}))
		.expect("Runtime settings should deserialize.");

		assert_eq!(settings.client_secret.as_ref().map(Secret::expose), Some("secret"));
		assert_eq!(settings.redirect_url.as_deref(), Some("https://app.example.com/auth/signup"));
		assert_eq!(
			settings.authorization_params.as_ref().and_then(|params| params.get("lang")),
			Some(&"fr".to_owned())
		);
	}

	#[test]
	fn settings_load_from_lookup() {
		let provider = ProviderId::cognito();
		let env = HashMap::from([
			("OAUTH_COGNITO_CLIENT_ID", "client"),
			("OAUTH_COGNITO_CLIENT_SECRET", "secret"),
			("OAUTH_COGNITO_USER_POOL_ID", "pool"),
			("OAUTH_COGNITO_REGION", ""),
			("OAUTH_COGNITO_REDIRECT_URL", "https://app.example.com/cb"),
		]);
		let settings =
			ProviderSettings::from_lookup(&provider, |name| env.get(name).map(|v| v.to_string()));

		assert_eq!(settings.client_id.as_deref(), Some("client"));
		assert_eq!(settings.region, None);
		assert_eq!(settings.redirect_url.as_deref(), Some("https://app.example.com/cb"));
	}

	#[test]
	fn redirect_uri_precedence() {
		let request_url = Url::parse("https://app.example.com/auth/signup?code=abc#frag")
			.expect("Request URL fixture should parse.");
		let mut config = ProviderConfig::resolve(&EnvOverrides::default(), None);
		let derived = resolve_redirect_uri(&EnvOverrides::default(), &config, &request_url)
			.expect("Derived redirect should resolve.");

		assert_eq!(derived.as_str(), "https://app.example.com/auth/signup");

		config.redirect_url = Some("https://configured.example.com/cb".into());

		let configured = resolve_redirect_uri(&EnvOverrides::default(), &config, &request_url)
			.expect("Configured redirect should resolve.");

		assert_eq!(configured.as_str(), "https://configured.example.com/cb");

		let overrides = EnvOverrides {
			redirect_url: Some("https://override.example.com/cb".into()),
			..Default::default()
		};
		let overridden = resolve_redirect_uri(&overrides, &config, &request_url)
			.expect("Override redirect should resolve.");

		assert_eq!(overridden.as_str(), "https://override.example.com/cb");

		config.redirect_url = Some("not a url".into());

		assert!(matches!(
			resolve_redirect_uri(&EnvOverrides::default(), &config, &request_url),
			Err(ConfigError::InvalidRedirect { .. })
		));
	}
}
