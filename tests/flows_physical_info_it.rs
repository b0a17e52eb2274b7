#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use polar_oauth_bridge::{
	_preludet::*,
	auth::UserId,
	error::UpstreamError,
	flows::PhysicalInfoQuery,
	reply::Reply,
	store::{TokenKey, TokenStore},
};

const PHYSICAL_INFO_PATH: &str = "/v3/users/12345/physical-information";

fn user() -> UserId {
	UserId::new("12345").expect("User fixture should be valid.")
}

async fn seed_token(store: &dyn TokenStore, token: &str) {
	store
		.set(&TokenKey::for_user(&user()), token, Some(Duration::hours(1)))
		.await
		.expect("Seeding the memory store should succeed.");
}

#[tokio::test]
async fn missing_token_is_a_client_fault_without_network_calls() {
	let server = MockServer::start_async().await;
	let (bridge, _, _) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PHYSICAL_INFO_PATH);
			then.status(200).body("{}");
		})
		.await;
	let err = bridge
		.physical_info(&user())
		.await
		.expect_err("Users without a stored token should be rejected.");

	resource_mock.assert_calls_async(0).await;

	assert!(matches!(&err, Error::NotAuthorized { user_id } if user_id.as_str() == "12345"));
	assert_eq!(err.status_code(), 400);
	assert_eq!(err.to_string(), "No access token found for user 12345");
}

#[tokio::test]
async fn stored_token_fetches_body_verbatim() {
	let server = MockServer::start_async().await;
	let (bridge, store, _) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let body = "{\"weight\": 70.50, \"height\":180,\"birthdate\":\"1990-01-01\",\"extra\":[1,  2]}";
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PHYSICAL_INFO_PATH)
				.header("authorization", "Bearer T")
				.header("accept", "application/json");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;

	seed_token(&*store, "T").await;

	let info = bridge
		.fetch_physical_info(PhysicalInfoQuery { user_id: Some("12345".into()) })
		.await
		.expect("Physical info fetch should succeed.");

	resource_mock.assert_async().await;

	assert_eq!(info.user_id, user());
	assert_eq!(info.as_json(), body);
	assert_eq!(
		Reply::physical_info(&info),
		Reply::Text { status: 200, body: format!("Physical Info for user 12345: {body}") }
	);
}

#[tokio::test]
async fn provider_failures_surface_status_and_body() {
	let server = MockServer::start_async().await;
	let (bridge, store, _) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PHYSICAL_INFO_PATH);
			then.status(500).body("upstream down");
		})
		.await;

	seed_token(&*store, "T").await;

	let err = bridge
		.physical_info(&user())
		.await
		.expect_err("Provider failures should fail the fetch.");

	resource_mock.assert_async().await;

	assert!(matches!(err, Error::Fetch(UpstreamError::Status { status: 500, .. })));
	assert_eq!(err.status_code(), 500);
	assert_eq!(err.to_string(), "Physical info fetch failed: 500 - upstream down");
}

#[tokio::test]
async fn expired_tokens_are_treated_as_missing() {
	let server = MockServer::start_async().await;
	let (bridge, store, clock) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PHYSICAL_INFO_PATH);
			then.status(200).body("{}");
		})
		.await;

	seed_token(&*store, "T").await;
	clock.advance(Duration::hours(1));

	let err = bridge
		.physical_info(&user())
		.await
		.expect_err("Expired tokens should not be used.");

	resource_mock.assert_calls_async(0).await;

	assert!(matches!(err, Error::NotAuthorized { .. }));
}

#[tokio::test]
async fn missing_user_id_is_rejected() {
	let (bridge, _, _) = build_reqwest_test_bridge(test_config("http://127.0.0.1:9"));

	for user_id in [None, Some(String::new())] {
		let err = bridge
			.fetch_physical_info(PhysicalInfoQuery { user_id })
			.await
			.expect_err("A missing userId should be rejected.");

		assert!(matches!(err, Error::MissingInput { parameter: "userId", .. }));
		assert_eq!(err.status_code(), 400);
		assert_eq!(err.to_string(), "User ID is required (e.g., /user/physical-info?userId=123)");
	}
}

#[tokio::test]
async fn non_json_success_bodies_are_fetch_failures() {
	let server = MockServer::start_async().await;
	let (bridge, store, _) = build_reqwest_test_bridge(test_config(&server.base_url()));
	let _resource_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(PHYSICAL_INFO_PATH);
			then.status(200).body("<html>maintenance</html>");
		})
		.await;

	seed_token(&*store, "T").await;

	let err = bridge
		.physical_info(&user())
		.await
		.expect_err("Non-JSON bodies should fail the fetch.");

	assert!(matches!(err, Error::Fetch(UpstreamError::Decode { status: 200, .. })));
}
