//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// crates.io
use httpmock::prelude::*;
// self
use cognito_signup::{
	config::ProviderSettings,
	flows::{ReqwestSignupFlow, SignupRequest},
	http::ReqwestHttpClient,
	provider::{DiscoveryBase, ProviderId},
	reqwest::{Client as ReqwestClient, redirect::Policy},
	url::Url,
};

pub const CLIENT_ID: &str = "client-it";
pub const CLIENT_SECRET: &str = "secret-it";
pub const USER_POOL_ID: &str = "us-east-1_TestPool";
pub const REGION: &str = "us-east-1";
pub const APP_URL: &str = "https://app.example.com/auth/signup";

pub fn settings() -> ProviderSettings {
	ProviderSettings {
		client_id: Some(CLIENT_ID.into()),
		client_secret: Some(CLIENT_SECRET.into()),
		user_pool_id: Some(USER_POOL_ID.into()),
		region: Some(REGION.into()),
		..Default::default()
	}
}

pub fn issuer(server: &MockServer) -> String {
	format!("{}/{USER_POOL_ID}", server.base_url())
}

pub fn discovery_path() -> String {
	format!("/{USER_POOL_ID}/.well-known/openid-configuration")
}

/// Reqwest client that trusts the mock server's self-signed certificate and, like
/// [`ReqwestHttpClient::new`], never follows redirects.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = ReqwestClient::builder()
		.redirect(Policy::none())
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn flow(server: &MockServer) -> ReqwestSignupFlow {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");

	ReqwestSignupFlow::with_http_client(ProviderId::cognito(), test_reqwest_http_client())
		.with_discovery_base(DiscoveryBase::Custom(base))
}

pub fn request(query: Option<&str>) -> SignupRequest {
	let raw = match query {
		Some(query) => format!("{APP_URL}?{query}"),
		None => APP_URL.to_owned(),
	};

	SignupRequest::parse(&raw).expect("Request URL should parse.")
}

pub async fn mock_discovery(server: &MockServer) -> httpmock::Mock<'_> {
	let document = serde_json::json!({
		"issuer": issuer(server),
		"authorization_endpoint": server.url("/oauth2/authorize"),
		"token_endpoint": server.url("/oauth2/token"),
		"userinfo_endpoint": server.url("/oauth2/userInfo"),
		"end_session_endpoint": server.url("/logout"),
		"response_types_supported": ["code", "token"]
	});

	server
		.mock_async(|when, then| {
			when.method(GET).path(discovery_path());
			then.status(200).header("content-type", "application/json").json_body(document);
		})
		.await
}

pub async fn mock_token_success(server: &MockServer) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2/token")
				.header("content-type", "application/x-www-form-urlencoded");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"token_type": "Bearer",
					"access_token": "access-it",
					"id_token": "id-it",
					"refresh_token": "refresh-it",
					"expires_in": 3600
				}),
			);
		})
		.await
}

pub async fn mock_userinfo(server: &MockServer, body: serde_json::Value) -> httpmock::Mock<'_> {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2/userInfo").header("authorization", "Bearer access-it");
			then.status(200).header("content-type", "application/json").json_body(body);
		})
		.await
}
