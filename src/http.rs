//! Transport primitives for provider calls.
//!
//! The module exposes [`ProviderHttpClient`], the bridge's only dependency on an HTTP stack,
//! plus the request builders shared by the token exchange, member registration, and resource
//! fetch. Requests and responses use the `oauth2` crate's [`HttpRequest`] / [`HttpResponse`]
//! aliases so any transport speaking the `http` crate types can be plugged in.

pub use oauth2::{HttpClientError, HttpRequest, HttpResponse};

// crates.io
use oauth2::http::{
	Method, Request,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
// self
use crate::{
	_prelude::*,
	error::{TransportError, UpstreamError},
};

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// Boxed future returned by [`ProviderHttpClient::execute`].
pub type HttpFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, HttpClientError<E>>> + 'a + Send>>;

/// Abstraction over HTTP transports used for every provider call.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by all
/// concurrent flows. Each call is attempted exactly once; implementations must not retry, and
/// any timeout they apply surfaces as a transport failure of the calling operation.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves with the provider's response, whatever its status.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Status and body of a provider response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Body decoded as (lossy) UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Converts the response into an [`UpstreamError::Status`].
	pub fn into_status_error(self) -> UpstreamError {
		let body = self.text();

		UpstreamError::Status { status: self.status, body }
	}

	/// Deserializes the JSON body, reporting the failing path on error.
	pub fn decode<T>(&self) -> Result<T, UpstreamError>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|e| UpstreamError::Decode { status: self.status, source: Box::new(e) })
	}

	/// Validates the body as a single JSON value and keeps its bytes untouched.
	///
	/// Only whitespace around the value is dropped.
	pub fn raw_json(&self) -> Result<Box<RawValue>, UpstreamError> {
		serde_json::from_slice(&self.body)
			.map_err(|e| UpstreamError::Decode { status: self.status, source: Box::new(e) })
	}
}
impl From<HttpResponse> for ProviderResponse {
	fn from(response: HttpResponse) -> Self {
		let status = response.status().as_u16();

		Self { status, body: response.into_body() }
	}
}

/// Sends one request and collapses transport failures into [`UpstreamError::Transport`].
pub(crate) async fn send<C>(client: &C, request: HttpRequest) -> Result<ProviderResponse, UpstreamError>
where
	C: ?Sized + ProviderHttpClient,
{
	let response = client.execute(request).await.map_err(map_transport_error)?;

	Ok(response.into())
}

/// Maps an [`HttpClientError`] emitted by a transport into a [`TransportError`].
pub fn map_transport_error<E>(err: HttpClientError<E>) -> TransportError
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner },
		HttpClientError::Http(inner) => TransportError::Request(inner),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		_ => TransportError::Other { message: "Unrecognized HTTP client failure.".into() },
	}
}

/// `POST` with a form-encoded body (token endpoint).
pub(crate) fn form_post(
	url: &Url,
	authorization: &str,
	form: String,
) -> Result<HttpRequest, TransportError> {
	Ok(Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, APPLICATION_FORM)
		.header(ACCEPT, APPLICATION_JSON)
		.header(AUTHORIZATION, authorization)
		.body(form.into_bytes())?)
}

/// `POST` with a JSON body.
pub(crate) fn json_post(
	url: &Url,
	authorization: &str,
	body: Vec<u8>,
) -> Result<HttpRequest, TransportError> {
	Ok(Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, APPLICATION_JSON)
		.header(ACCEPT, APPLICATION_JSON)
		.header(AUTHORIZATION, authorization)
		.body(body)?)
}

/// `GET` expecting a JSON response.
pub(crate) fn json_get(url: &Url, authorization: &str) -> Result<HttpRequest, TransportError> {
	Ok(Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(ACCEPT, APPLICATION_JSON)
		.header(AUTHORIZATION, authorization)
		.body(Vec::new())?)
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider calls should not follow redirects; [`ReqwestHttpClient::new`] disables them. Any
/// custom [`ReqwestClient`] passed to [`ReqwestHttpClient::with_client`] should do the same.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects and gives up after `timeout`, if set.
	pub fn new(timeout: Option<std::time::Duration>) -> Result<Self, crate::error::ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let request: reqwest::Request = request.try_into().map_err(Box::new)?;
			let response = client.execute(request).await.map_err(Box::new)?;
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
