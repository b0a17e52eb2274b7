//! HTTP surface: the login redirect, the authorization callback, and the physical information
//! route.

// crates.io
use axum::{
	Router,
	extract::{RawQuery, State},
	http::{StatusCode, header::LOCATION},
	response::{IntoResponse, Response},
	routing::get,
};
use tokio::net::TcpListener;
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	flows::{Bridge, CallbackParams, PhysicalInfoQuery},
	http::ProviderHttpClient,
	reply::Reply,
};

/// Decoded query string of a route; a repeated key resolves to its first occurrence.
///
/// Decoding is lossy and never fails, so malformed or duplicated parameters reach the flows
/// instead of being rejected by the extractor.
#[derive(Debug, Default)]
struct QueryPairs(Vec<(String, String)>);
impl QueryPairs {
	fn parse(raw: Option<String>) -> Self {
		Self(
			raw.map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
				.unwrap_or_default(),
		)
	}

	fn first(&self, name: &str) -> Option<String> {
		self.0.iter().find(|(key, _)| key == name).map(|(_, value)| value.clone())
	}
}

/// Builds the router serving every bridge route.
pub fn router<C>(bridge: Bridge<C>) -> Router
where
	C: ProviderHttpClient,
{
	Router::new()
		.route("/auth/login", get(login::<C>))
		.route("/auth/callback", get(callback::<C>))
		.route("/user/physical-info", get(physical_info::<C>))
		.with_state(bridge)
}

/// Serves the routes on `listener` until `shutdown` resolves, then drains in-flight requests.
///
/// The bridge (and with it the store connection) is dropped once the server stops.
pub async fn serve<C, F>(listener: TcpListener, bridge: Bridge<C>, shutdown: F) -> std::io::Result<()>
where
	C: ProviderHttpClient,
	F: 'static + Send + Future<Output = ()>,
{
	axum::serve(listener, router(bridge)).with_graceful_shutdown(shutdown).await
}

async fn login<C>(State(bridge): State<Bridge<C>>, RawQuery(raw): RawQuery) -> Reply
where
	C: ProviderHttpClient,
{
	let state = QueryPairs::parse(raw).first("state");

	Reply::Redirect(bridge.begin_authorization(state.as_deref()))
}

async fn callback<C>(State(bridge): State<Bridge<C>>, RawQuery(raw): RawQuery) -> Reply
where
	C: ProviderHttpClient,
{
	let query = QueryPairs::parse(raw);
	let params = CallbackParams {
		code: query.first("code"),
		error: query.first("error"),
		state: query.first("state"),
	};
	let result = bridge.complete_authorization(params).await;

	#[cfg(feature = "tracing")]
	match &result {
		Ok(outcome) => tracing::info!(
			user_id = %outcome.user_id,
			registration = outcome.registration.as_str(),
			"authorization completed"
		),
		Err(e) => tracing::warn!(error = %e, "authorization callback failed"),
	}

	Reply::from_result(result, Reply::authorized)
}

async fn physical_info<C>(State(bridge): State<Bridge<C>>, RawQuery(raw): RawQuery) -> Reply
where
	C: ProviderHttpClient,
{
	let query = PhysicalInfoQuery { user_id: QueryPairs::parse(raw).first("userId") };
	let result = bridge.fetch_physical_info(query).await;

	#[cfg(feature = "tracing")]
	if let Err(e) = &result {
		tracing::warn!(error = %e, "physical info request failed");
	}

	Reply::from_result(result, Reply::physical_info)
}

impl IntoResponse for Reply {
	fn into_response(self) -> Response {
		match self {
			Reply::Redirect(location) =>
				(StatusCode::FOUND, [(LOCATION, location.to_string())]).into_response(),
			Reply::Text { status, body } =>
				(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), body)
					.into_response(),
		}
	}
}
