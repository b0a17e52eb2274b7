//! Stored-token lookup followed by the Bearer-authorized physical information request.

// crates.io
use serde_json::value::RawValue;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserId},
	config::BridgeConfig,
	error::ConfigError,
	flows::Bridge,
	http::{self, ProviderHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{TokenKey, TokenStore},
};

const LOOKUP_TOKEN: &str = "lookup_token";
const FETCH_RESOURCE: &str = "fetch_resource";

/// Query of the physical information route (`?userId=..`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PhysicalInfoQuery {
	/// Provider user identifier; absent and empty are both rejected.
	#[serde(rename = "userId")]
	pub user_id: Option<String>,
}

/// Provider physical information document, kept exactly as received.
#[derive(Debug)]
pub struct PhysicalInfo {
	/// User the document belongs to.
	pub user_id: UserId,
	/// Raw JSON value returned by the provider.
	pub body: Box<RawValue>,
}
impl PhysicalInfo {
	/// JSON text of the document.
	pub fn as_json(&self) -> &str {
		self.body.get()
	}
}

/// Looks up a user's stored token and fetches provider resources with it.
pub struct ResourceFetcher<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	http_client: &'a C,
	store: &'a dyn TokenStore,
	config: &'a BridgeConfig,
}
impl<'a, C> ResourceFetcher<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a fetcher over the provided transport, store, and configuration.
	pub fn new(http_client: &'a C, store: &'a dyn TokenStore, config: &'a BridgeConfig) -> Self {
		Self { http_client, store, config }
	}

	/// Looks up and fetches in one go; see [`Self::stored_token`] and [`Self::fetch`].
	pub async fn physical_info(&self, user_id: &UserId) -> Result<PhysicalInfo> {
		let token = self.stored_token(user_id).await?;

		self.fetch(user_id, &token).await
	}

	/// Stored access token of `user_id`, or [`Error::NotAuthorized`] when there is none.
	pub async fn stored_token(&self, user_id: &UserId) -> Result<AccessToken> {
		self.store
			.get(&TokenKey::for_user(user_id))
			.await?
			.map(AccessToken::new)
			.ok_or_else(|| Error::NotAuthorized { user_id: user_id.clone() })
	}

	/// Fetches `<users>/<user_id>/physical-information` under `token`.
	///
	/// The body is returned unmodified; non-2xx answers and transport failures map to
	/// [`Error::Fetch`].
	pub async fn fetch(&self, user_id: &UserId, token: &AccessToken) -> Result<PhysicalInfo> {
		let url = self
			.config
			.descriptor
			.physical_information_url(user_id)
			.map_err(ConfigError::from)?;
		let request =
			http::json_get(&url, &token.bearer_header()).map_err(|e| Error::Fetch(e.into()))?;
		let response = http::send(self.http_client, request).await.map_err(Error::Fetch)?;

		if !response.is_success() {
			return Err(Error::Fetch(response.into_status_error()));
		}

		let body = response.raw_json().map_err(Error::Fetch)?;

		Ok(PhysicalInfo { user_id: user_id.clone(), body })
	}
}

impl<C> Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Fetches the physical information of a user who completed authorization earlier.
	pub async fn physical_info(&self, user_id: &UserId) -> Result<PhysicalInfo> {
		const KIND: FlowKind = FlowKind::PhysicalInfo;

		let span = FlowSpan::new(KIND, "physical_info");

		span.record_user(user_id);

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let fetcher = self.fetcher();
		let result = span
			.instrument(async {
				let token = fetcher.stored_token(user_id).await?;

				span.transition(LOOKUP_TOKEN, FETCH_RESOURCE);

				fetcher.fetch(user_id, &token).await
			})
			.await;

		obs::record_flow_result(KIND, &result);

		result
	}

	/// Validates the route query, then runs [`Bridge::physical_info`].
	pub async fn fetch_physical_info(&self, query: PhysicalInfoQuery) -> Result<PhysicalInfo> {
		let user_id = query
			.user_id
			.and_then(|raw| UserId::new(raw).ok())
			.ok_or_else(Error::missing_user_id)?;

		self.physical_info(&user_id).await
	}
}
