#![cfg(feature = "reqwest")]

// std
use std::collections::VecDeque;
// crates.io
use httpmock::prelude::*;
// self
use polar_oauth_bridge::{
	_preludet::*,
	auth::UserId,
	error::{TransportError, UpstreamError},
	flows::{Bridge, CallbackParams, RegistrationOutcome},
	http::{
		HttpClientError, HttpFuture, HttpRequest, HttpResponse, ProviderHttpClient,
		ReqwestHttpClient,
	},
	oauth::oauth2::http::{StatusCode, header::AUTHORIZATION},
	store::{MemoryStore, TokenKey, TokenStore},
};

#[derive(Debug)]
struct FakeTransportError(&'static str);
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Fake transport failure: {}.", self.0)
	}
}
impl StdError for FakeTransportError {}

type Scripted = Result<(u16, &'static str), &'static str>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RecordedRequest {
	method: String,
	uri: String,
	authorization: Option<String>,
	body: String,
}

#[derive(Default)]
struct ScriptedHttpClient {
	responses: Mutex<VecDeque<Scripted>>,
	requests: Mutex<Vec<RecordedRequest>>,
}
impl ScriptedHttpClient {
	fn new(responses: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
		Arc::new(Self {
			responses: Mutex::new(responses.into_iter().collect()),
			..Default::default()
		})
	}

	fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}
}
impl ProviderHttpClient for ScriptedHttpClient {
	type TransportError = FakeTransportError;

	fn execute(&self, request: HttpRequest) -> HttpFuture<'_, Self::TransportError> {
		self.requests.lock().push(RecordedRequest {
			method: request.method().to_string(),
			uri: request.uri().to_string(),
			authorization: request
				.headers()
				.get(AUTHORIZATION)
				.and_then(|value| value.to_str().ok())
				.map(ToOwned::to_owned),
			body: String::from_utf8_lossy(request.body()).into_owned(),
		});

		let next = self.responses.lock().pop_front();

		Box::pin(async move {
			match next {
				Some(Ok((status, body))) => {
					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Some(Err(reason)) =>
					Err(HttpClientError::Reqwest(Box::new(FakeTransportError(reason)))),
				None => Err(HttpClientError::Other("No scripted response left.".into())),
			}
		})
	}
}

fn scripted_bridge(
	client: &Arc<ScriptedHttpClient>,
) -> (Bridge<ScriptedHttpClient>, Arc<MemoryStore>) {
	let store = Arc::new(MemoryStore::default());
	let dyn_store: Arc<dyn TokenStore> = store.clone();
	let bridge =
		Bridge::with_http_client(test_config("https://polar.test"), dyn_store, client.clone());

	(bridge, store)
}

#[tokio::test]
async fn callback_runs_over_any_transport() {
	let client = ScriptedHttpClient::new([
		Ok((200, "{\"access_token\":\"T\",\"x_user_id\":\"U\",\"expires_in\":3600}")),
		Ok((409, "{}")),
	]);
	let (bridge, _) = scripted_bridge(&client);
	let outcome = bridge
		.complete_authorization(CallbackParams::with_code("a b"))
		.await
		.expect("Callback should complete over the scripted transport.");

	assert_eq!(outcome.registration, RegistrationOutcome::AlreadyRegistered);

	let requests = client.requests();

	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].method, "POST");
	assert_eq!(requests[0].uri, "https://polar.test/v2/oauth2/token");
	assert!(requests[0].authorization.as_deref().is_some_and(|value| value.starts_with("Basic ")));
	assert_eq!(
		requests[0].body,
		"grant_type=authorization_code&code=a+b&redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"
	);
	assert_eq!(requests[1].uri, "https://polar.test/v3/users");
	assert_eq!(requests[1].authorization.as_deref(), Some("Bearer T"));
	assert_eq!(requests[1].body, "{\"member-id\":\"U\"}");
}

#[tokio::test]
async fn transport_failures_are_classified_by_stage() {
	let client = ScriptedHttpClient::new([
		Ok((200, "{\"access_token\":\"T\",\"x_user_id\":\"U\"}")),
		Err("connection reset"),
	]);
	let (bridge, store) = scripted_bridge(&client);
	let err = bridge
		.complete_authorization(CallbackParams::with_code("abc"))
		.await
		.expect_err("A registration transport failure should fail the callback.");

	assert!(matches!(
		err,
		Error::Registration(UpstreamError::Transport(TransportError::Network { .. }))
	));
	assert!(err.to_string().contains("connection reset"));
	assert_eq!(client.requests().len(), 2);

	let key = TokenKey::for_user(&UserId::new("U").expect("User fixture should be valid."));

	assert!(store.get(&key).await.expect("Reads should succeed.").is_some());
}

#[tokio::test]
async fn reqwest_timeouts_fail_the_calling_operation() {
	let server = MockServer::start_async().await;
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v2/oauth2/token");
			then.status(200).delay(std::time::Duration::from_secs(2)).body("{}");
		})
		.await;
	let http_client = ReqwestHttpClient::new(Some(std::time::Duration::from_millis(100)))
		.expect("Reqwest client should build.");
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let bridge: ReqwestTestBridge =
		Bridge::with_http_client(test_config(&server.base_url()), store, http_client);
	let err = bridge
		.complete_authorization(CallbackParams::with_code("abc"))
		.await
		.expect_err("Slow token endpoints should time out.");

	match err {
		Error::Exchange(UpstreamError::Transport(transport)) => assert!(transport.is_timeout()),
		other => panic!("Expected a timed-out exchange, got {other:?}."),
	}
}
