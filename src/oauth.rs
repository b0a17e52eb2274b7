//! OAuth exchanger: authorization URL construction and the authorization-code exchange.

pub use oauth2;

// crates.io
use oauth2::{AuthUrl, CsrfToken, RedirectUrl, basic::BasicClient};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{TokenGrant, UserId},
	config::BridgeConfig,
	http::{self, ProviderHttpClient},
};

/// `state` used when the caller supplies none.
pub const DEFAULT_STATE: &str = "default";

/// Success body of the token endpoint.
///
/// Polar omits `token_type`, so the body is decoded here rather than through the `oauth2`
/// token response types.
#[derive(Clone, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	#[serde(default)]
	x_user_id: Option<RawUserId>,
	#[serde(default)]
	expires_in: Option<i64>,
}

/// `x_user_id` arrives as a JSON string or a JSON integer depending on the deployment.
#[derive(Clone, Deserialize)]
#[serde(untagged)]
enum RawUserId {
	Text(String),
	Number(u64),
}
impl RawUserId {
	fn into_user_id(self) -> Option<UserId> {
		match self {
			Self::Text(value) => UserId::new(value).ok(),
			Self::Number(value) => UserId::new(value.to_string()).ok(),
		}
	}
}

/// Builds authorization redirects and exchanges authorization codes for access tokens.
///
/// The exchanger borrows the shared transport and configuration; it is cheap to construct per
/// request.
pub struct OAuthExchanger<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	http_client: &'a C,
	config: &'a BridgeConfig,
}
impl<'a, C> OAuthExchanger<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates an exchanger over the provided transport and configuration.
	pub fn new(http_client: &'a C, config: &'a BridgeConfig) -> Self {
		Self { http_client, config }
	}

	/// Authorization URL the end user is redirected to.
	///
	/// See [`authorization_url`].
	pub fn authorization_url(&self, state: Option<&str>) -> Url {
		authorization_url(self.config, state)
	}

	/// Exchanges `code` for an access token with exactly one token endpoint call.
	///
	/// Non-2xx answers and transport failures map to [`Error::Exchange`]; a successful answer
	/// without a usable `x_user_id` maps to [`Error::MissingIdentity`].
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
		let form = Serializer::new(String::new())
			.append_pair("grant_type", "authorization_code")
			.append_pair("code", code)
			.append_pair("redirect_uri", self.config.redirect_uri.as_str())
			.finish();
		let request = http::form_post(
			&self.config.descriptor.endpoints.token,
			&self.config.credentials.basic_auth_header(),
			form,
		)
		.map_err(|e| Error::Exchange(e.into()))?;
		let response = http::send(self.http_client, request).await.map_err(Error::Exchange)?;

		if !response.is_success() {
			return Err(Error::Exchange(response.into_status_error()));
		}

		let body = response.decode::<TokenEndpointResponse>().map_err(Error::Exchange)?;
		let user_id =
			body.x_user_id.and_then(RawUserId::into_user_id).ok_or(Error::MissingIdentity)?;
		let mut grant = TokenGrant::new(body.access_token, user_id);

		if let Some(expires_in) = body.expires_in {
			grant = grant.with_expires_in(Duration::seconds(expires_in));
		}

		Ok(grant)
	}
}

/// Builds `<authorization endpoint>?response_type=code&client_id=..&state=..&redirect_uri=..`.
///
/// A missing or empty `state` is replaced by [`DEFAULT_STATE`]. The result depends only on the
/// configuration and `state`.
pub fn authorization_url(config: &BridgeConfig, state: Option<&str>) -> Url {
	let state = state.filter(|value| !value.is_empty()).unwrap_or(DEFAULT_STATE).to_owned();
	let client = BasicClient::new(config.credentials.client_id.clone())
		.set_auth_uri(AuthUrl::from_url(config.descriptor.endpoints.authorization.clone()))
		.set_redirect_uri(RedirectUrl::from_url(config.redirect_uri.clone()));
	let (url, _) = client.authorize_url(|| CsrfToken::new(state)).url();

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::ClientCredentials, provider::ProviderDescriptor};

	fn config() -> BridgeConfig {
		BridgeConfig::new(
			ClientCredentials::new("client-1", "secret-1"),
			Url::parse("http://localhost:3000/auth/callback")
				.expect("Redirect fixture should parse."),
			ProviderDescriptor::polar().expect("Polar descriptor should build."),
		)
	}

	fn query(url: &Url) -> HashMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn authorization_url_carries_every_parameter() {
		let url = authorization_url(&config(), Some("xyz"));
		let query = query(&url);

		assert_eq!(url.host_str(), Some("flow.polar.com"));
		assert_eq!(url.path(), "/oauth2/authorization");
		assert_eq!(query["response_type"], "code");
		assert_eq!(query["client_id"], "client-1");
		assert_eq!(query["redirect_uri"], "http://localhost:3000/auth/callback");
		assert_eq!(query["state"], "xyz");
		assert!(!url.as_str().contains("secret-1"));
	}

	#[test]
	fn missing_or_empty_state_defaults() {
		let config = config();

		assert_eq!(query(&authorization_url(&config, None))["state"], DEFAULT_STATE);
		assert_eq!(query(&authorization_url(&config, Some("")))["state"], DEFAULT_STATE);
	}

	#[test]
	fn authorization_url_is_deterministic_and_encodes_state() {
		let config = config();
		let first = authorization_url(&config, Some("a b&c=d"));
		let second = authorization_url(&config, Some("a b&c=d"));

		assert_eq!(first, second);
		assert_eq!(query(&first)["state"], "a b&c=d");
	}

	#[test]
	fn user_ids_decode_from_strings_and_numbers() {
		let text: TokenEndpointResponse =
			serde_json::from_str(r#"{"access_token":"t","x_user_id":"12345","expires_in":3600}"#)
				.expect("String identifiers should decode.");
		let number: TokenEndpointResponse =
			serde_json::from_str(r#"{"access_token":"t","x_user_id":12345}"#)
				.expect("Numeric identifiers should decode.");
		let missing: TokenEndpointResponse = serde_json::from_str(r#"{"access_token":"t"}"#)
			.expect("Responses without identifiers should decode.");

		assert_eq!(
			text.x_user_id.and_then(RawUserId::into_user_id).map(|id| id.to_string()),
			Some("12345".into())
		);
		assert_eq!(
			number.x_user_id.and_then(RawUserId::into_user_id).map(|id| id.to_string()),
			Some("12345".into())
		);
		assert!(missing.x_user_id.is_none());
		assert_eq!(missing.expires_in, None);
	}

	#[test]
	fn empty_user_id_is_not_an_identity() {
		let body: TokenEndpointResponse =
			serde_json::from_str(r#"{"access_token":"t","x_user_id":""}"#)
				.expect("Empty identifiers should decode.");

		assert!(body.x_user_id.and_then(RawUserId::into_user_id).is_none());
	}
}
