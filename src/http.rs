//! Transport primitives for provider calls.
//!
//! [`ProviderHttpClient`] is the flow's only dependency on an HTTP stack. It hands out
//! short-lived [`AsyncHttpClient`] handles that carry a per-call timeout, so discovery, the
//! token exchange, and the userinfo fetch each get their own bound on worst-case latency.
//! Status codes are never turned into errors at this layer; callers inspect the returned
//! [`HttpResponse`] themselves.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::TransportError};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Abstraction over HTTP transports used by the sign-up flow.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared by every
/// request handled by a flow, and the handles they return must own whatever state their
/// request futures need so those futures stay `Send`.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle bound to a timeout.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle whose requests give up after `timeout` (`None` keeps the client
	/// default).
	fn handle(&self, timeout: Option<Duration>) -> Self::Handle;
}

/// Converts an [`HttpClientError`] into the crate's transport error.
pub fn transport_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner },
		HttpClientError::Http(inner) => TransportError::network(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "unknown HTTP client failure".into() },
	}
}

/// Lossy UTF-8 preview of a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider endpoints answer directly, so a custom [`ReqwestClient`] should be configured not
/// to follow redirects; the default client built here does not.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type Handle = TimedHandle;
	type TransportError = ReqwestError;

	fn handle(&self, timeout: Option<Duration>) -> Self::Handle {
		TimedHandle::new(self.0.clone(), timeout)
	}
}

#[cfg(feature = "reqwest")]
struct TimedHttpClient {
	client: ReqwestClient,
	timeout: Option<std::time::Duration>,
}

#[cfg(feature = "reqwest")]
/// Handle returned by [`ReqwestHttpClient`] that applies a per-request timeout.
#[derive(Clone)]
pub struct TimedHandle(Arc<TimedHttpClient>);
#[cfg(feature = "reqwest")]
impl TimedHandle {
	fn new(client: ReqwestClient, timeout: Option<Duration>) -> Self {
		let timeout = timeout.filter(|value| value.is_positive()).map(|value| value.unsigned_abs());

		Self(Arc::new(TimedHttpClient { client, timeout }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for TimedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			if let Some(timeout) = inner.timeout {
				*request.timeout_mut() = Some(timeout);
			}

			let response = inner.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}
