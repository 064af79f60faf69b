//! Request handler for the sign-up and login endpoints.
//!
//! A request without a `code` is sent to the hosted sign-up page (or the login page in
//! [`FlowMode::Login`]). A request with a `code` is the provider's callback: the code is
//! exchanged, the user's profile fetched, a minimal session handed to the session collaborator,
//! and the user redirected home. Missing configuration and
//! provider rejections go through the flow's [`ErrorPolicy`](crate::flows::ErrorPolicy); every
//! other failure is returned as a fault.

// self
use crate::{
	_prelude::*,
	config::{self, EnvOverrides, ProviderConfig, RuntimeConfig},
	flows::{FlowMode, FlowResponse, SignupFlow, SignupRequest, mapper},
	http::ProviderHttpClient,
	oauth::{self, AuthorizationCodeRequest, TokenResponse},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{self, DiscoveryKey, ProviderMetadata},
	session::{SessionRecord, SessionWriter},
};

impl<C> SignupFlow<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Handles one request to the sign-up (or login) endpoint.
	///
	/// `runtime` supplies the provider settings and `session` persists the session once the
	/// user is known. Both are consulted on every call, so configuration changes apply to the
	/// next request.
	pub async fn handle(
		&self,
		request: &SignupRequest,
		runtime: &dyn RuntimeConfig,
		session: &dyn SessionWriter,
	) -> Result<FlowResponse> {
		let config =
			ProviderConfig::resolve(&self.overrides, runtime.provider_settings(&self.provider));

		if let Err(missing) = config.validate() {
			obs::record_flow_outcome(FlowStage::Configuration, FlowOutcome::Handled);

			return self
				.error_policy
				.apply(request, mapper::missing_configuration(&self.provider, &missing));
		}

		let redirect_uri = match self.mode {
			FlowMode::Signup => config::resolve_redirect_uri(&self.overrides, &config, &request.url)?,
			// The sign-up redirect override does not apply to the hosted login page.
			FlowMode::Login =>
				config::resolve_redirect_uri(&EnvOverrides::default(), &config, &request.url)?,
		};
		let (key, metadata) = self.stage(FlowStage::Discovery, self.metadata(&config)).await?;
		let Some(code) = request.code() else {
			let url = match self.mode {
				FlowMode::Signup => {
					let build = async {
						oauth::build_signup_url(&metadata, &config, &redirect_uri).map_err(Error::from)
					};

					self.stage(FlowStage::SignupRedirect, build).await?
				},
				FlowMode::Login => {
					let build =
						async { Ok::<_, Error>(oauth::build_login_url(&metadata, &config, &redirect_uri)) };

					self.stage(FlowStage::LoginRedirect, build).await?
				},
			};

			return Ok(FlowResponse::redirect(url));
		};
		let exchange = AuthorizationCodeRequest {
			client_id: &config.client_id,
			client_secret: &config.client_secret,
			redirect_uri: &redirect_uri,
			code: &code,
		};
		let response = self
			.stage(FlowStage::TokenExchange, async {
				let result = oauth::exchange_code(
					self.http_client.as_ref(),
					&metadata.token_endpoint,
					&exchange,
					self.encoding,
					Some(self.timeouts.token),
				)
				.await;

				self.invalidate_on_fault(&key, result)
			})
			.await?;
		let tokens = match response {
			TokenResponse::Success(tokens) => tokens,
			TokenResponse::Rejected(payload) => {
				obs::record_flow_outcome(FlowStage::TokenExchange, FlowOutcome::Handled);

				return self
					.error_policy
					.apply(request, mapper::access_token_error(&self.provider, &payload));
			},
		};
		let profile = self
			.stage(FlowStage::UserInfo, async {
				let result = oauth::fetch_user_info(
					self.http_client.as_ref(),
					&metadata.userinfo_endpoint,
					&tokens,
					Some(self.timeouts.userinfo),
				)
				.await;

				self.invalidate_on_fault(&key, result)
			})
			.await?;
		let record = match self.mode {
			FlowMode::Signup => SessionRecord::minimal(&profile, &tokens),
			FlowMode::Login => SessionRecord::login(&profile, OffsetDateTime::now_utc()),
		};

		self.stage(FlowStage::Session, async move {
			record.ensure_within(self.session_limit)?;
			session.set_user_session(request, record).await.map_err(Error::from)
		})
		.await?;

		Ok(FlowResponse::redirect(self.home_location.clone()))
	}

	async fn metadata(
		&self,
		config: &ProviderConfig,
	) -> Result<(DiscoveryKey, Arc<ProviderMetadata>)> {
		let key = DiscoveryKey::resolve(&self.discovery_base, &config.region, &config.user_pool_id)?;
		let cache = self.discovery_cache.as_deref();

		if let Some(hit) = cache.and_then(|cache| cache.get(&key, OffsetDateTime::now_utc())) {
			return Ok((key, hit));
		}

		let metadata = Arc::new(
			provider::discover(
				self.http_client.as_ref(),
				&self.discovery_base,
				config,
				Some(self.timeouts.discovery),
			)
			.await?,
		);

		if let Some(cache) = cache {
			cache.insert(key.clone(), metadata.clone(), OffsetDateTime::now_utc());
		}

		Ok((key, metadata))
	}

	/// Drops cached metadata when a call to a discovered endpoint fails.
	fn invalidate_on_fault<T>(&self, key: &DiscoveryKey, result: Result<T>) -> Result<T> {
		if let (Err(Error::Transport(_) | Error::Response(_)), Some(cache)) =
			(&result, self.discovery_cache.as_deref())
		{
			cache.invalidate(key);
		}

		result
	}

	async fn stage<T, Fut>(&self, stage: FlowStage, fut: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		let span = FlowSpan::new(&self.provider, stage);

		obs::record_flow_outcome(stage, FlowOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(stage, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(stage, FlowOutcome::Failure),
		}

		result
	}
}
