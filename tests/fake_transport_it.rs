// std
use std::{
	collections::{HashMap, VecDeque},
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
// self
use cognito_signup::{
	config::ProviderSettings,
	error::{Error, TransportError},
	flows::{SignupFlow, SignupRequest, Timeouts},
	http::ProviderHttpClient,
	oauth::oauth2::{
		AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
		http::{StatusCode, header},
	},
	provider::{DiscoveryBase, ProviderId},
	session::MemorySessionStore,
	time::Duration,
	url::Url,
};

const BASE: &str = "https://idp.test";
const POOL: &str = "eu-west-1_Fake";

#[derive(Debug)]
enum FakeTransportError {
	Unreachable,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Unreachable => write!(f, "Host unreachable."),
		}
	}
}
impl StdError for FakeTransportError {}

enum Scripted {
	Respond(u16, &'static str),
	Fail,
}

#[derive(Debug)]
struct Sent {
	method: String,
	uri: String,
	headers: HashMap<String, String>,
	body: Vec<u8>,
	timeout: Option<Duration>,
}

#[derive(Clone, Default)]
struct ScriptedHttpClient {
	script: Arc<Mutex<VecDeque<Scripted>>>,
	sent: Arc<Mutex<Vec<Sent>>>,
}
impl ScriptedHttpClient {
	fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
		Self { script: Arc::new(Mutex::new(script.into_iter().collect())), sent: Default::default() }
	}

	fn sent(&self) -> Vec<Sent> {
		std::mem::take(&mut *self.sent.lock())
	}
}
impl ProviderHttpClient for ScriptedHttpClient {
	type Handle = ScriptedHandle;
	type TransportError = FakeTransportError;

	fn handle(&self, timeout: Option<Duration>) -> Self::Handle {
		ScriptedHandle { client: self.clone(), timeout }
	}
}

struct ScriptedHandle {
	client: ScriptedHttpClient,
	timeout: Option<Duration>,
}
impl<'a> AsyncHttpClient<'a> for ScriptedHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let headers = request
				.headers()
				.iter()
				.map(|(name, value)| {
					(name.as_str().to_owned(), value.to_str().unwrap_or_default().to_owned())
				})
				.collect();

			self.client.sent.lock().push(Sent {
				method: request.method().as_str().to_owned(),
				uri: request.uri().to_string(),
				headers,
				body: request.body().clone(),
				timeout: self.timeout,
			});

			let next = self.client.script.lock().pop_front();

			match next {
				Some(Scripted::Respond(status, body)) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Some(Scripted::Fail) | None =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Unreachable))),
			}
		})
	}
}

fn discovery_document() -> &'static str {
	r#"{
		"issuer": "https://idp.test/eu-west-1_Fake",
		"authorization_endpoint": "https://idp.test/oauth2/authorize",
		"token_endpoint": "https://idp.test/oauth2/token",
		"userinfo_endpoint": "https://idp.test/oauth2/userInfo"
	}"#
}

fn settings() -> ProviderSettings {
	ProviderSettings {
		client_id: Some("fake-client".into()),
		client_secret: Some("fake secret".into()),
		user_pool_id: Some(POOL.into()),
		region: Some("eu-west-1".into()),
		redirect_url: Some("https://app.test/auth/signup".into()),
		..Default::default()
	}
}

fn flow(client: &ScriptedHttpClient) -> SignupFlow<ScriptedHttpClient> {
	SignupFlow::with_http_client(ProviderId::cognito(), client.clone())
		.with_discovery_base(DiscoveryBase::Custom(
			Url::parse(BASE).expect("Fake base URL should parse."),
		))
		.with_timeouts(Timeouts {
			discovery: Duration::seconds(2),
			token: Duration::seconds(3),
			userinfo: Duration::seconds(4),
		})
}

fn request(raw: &str) -> SignupRequest {
	SignupRequest::parse(raw).expect("Fake request URL should parse.")
}

#[tokio::test]
async fn full_flow_sends_the_expected_requests() {
	let client = ScriptedHttpClient::new([
		Scripted::Respond(200, discovery_document()),
		Scripted::Respond(200, r#"{"token_type":"Bearer","access_token":"fake-access"}"#),
		Scripted::Respond(200, r#"{"preferred_username":"grace","email":"grace@example.com"}"#),
	]);
	let store = MemorySessionStore::default();
	let response = flow(&client)
		.handle(&request("https://app.test/auth/signup?code=a%20b"), &settings(), &store)
		.await
		.expect("Scripted flow should succeed.");

	assert_eq!(response.location, "/");
	assert_eq!(store.len(), 1);

	let sent = client.sent();

	assert_eq!(sent.len(), 3);
	assert_eq!(sent[0].method, "GET");
	assert_eq!(sent[0].uri, "https://idp.test/eu-west-1_Fake/.well-known/openid-configuration");
	assert_eq!(sent[0].timeout, Some(Duration::seconds(2)));

	assert_eq!(sent[1].method, "POST");
	assert_eq!(sent[1].uri, "https://idp.test/oauth2/token");
	assert_eq!(
		sent[1].headers.get(header::CONTENT_TYPE.as_str()).map(String::as_str),
		Some("application/x-www-form-urlencoded")
	);
	assert_eq!(
		String::from_utf8_lossy(&sent[1].body),
		"grant_type=authorization_code&client_id=fake-client&client_secret=fake+secret&redirect_uri=https%3A%2F%2Fapp.test%2Fauth%2Fsignup&code=a+b"
	);
	assert_eq!(sent[1].timeout, Some(Duration::seconds(3)));

	assert_eq!(sent[2].method, "GET");
	assert_eq!(sent[2].uri, "https://idp.test/oauth2/userInfo");
	assert_eq!(
		sent[2].headers.get(header::AUTHORIZATION.as_str()).map(String::as_str),
		Some("Bearer fake-access")
	);
	assert_eq!(sent[2].timeout, Some(Duration::seconds(4)));
}

#[tokio::test]
async fn transport_failures_surface_as_transport_errors() {
	let client = ScriptedHttpClient::new([
		Scripted::Respond(200, discovery_document()),
		Scripted::Fail,
	]);
	let store = MemorySessionStore::default();
	let err = flow(&client)
		.handle(&request("https://app.test/auth/signup?code=abc"), &settings(), &store)
		.await
		.expect_err("Transport failures must propagate.");

	match &err {
		Error::Transport(TransportError::Network { source }) => {
			assert_eq!(source.to_string(), "Host unreachable.");
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	assert_eq!(err.status(), 502);
	assert!(store.is_empty());
	assert_eq!(client.sent().len(), 2);
}

#[tokio::test]
async fn non_json_unauthorized_bodies_fall_back_to_unknown_error() {
	let client = ScriptedHttpClient::new([
		Scripted::Respond(200, discovery_document()),
		Scripted::Respond(401, "Unauthorized"),
	]);
	let err = flow(&client)
		.handle(
			&request("https://app.test/auth/signup?code=abc"),
			&settings(),
			&MemorySessionStore::default(),
		)
		.await
		.expect_err("Rejections must be raised without a delegate.");
	let handler = err.as_handler().expect("Rejections should be handler errors.");

	assert_eq!(handler.message, "Cognito login failed: Unknown error");
	assert_eq!(handler.data, Some("Unauthorized".into()));
}
