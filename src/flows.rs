//! Flow orchestration over the exchanger, token store, registrar, and resource fetcher.

pub mod callback;
pub mod physical_info;
pub mod registration;

pub use callback::*;
pub use physical_info::*;
pub use registration::*;

// self
use crate::{
	_prelude::*,
	config::BridgeConfig,
	http::ProviderHttpClient,
	oauth::OAuthExchanger,
	store::TokenStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Bridge specialized for the crate's default reqwest transport.
pub type ReqwestBridge = Bridge<ReqwestHttpClient>;

/// Sequences the authorization callback and resource lookups for one provider.
///
/// The bridge owns the shared transport, token store, and configuration. The leaf components
/// ([`OAuthExchanger`], [`UserRegistrar`], [`ResourceFetcher`]) borrow from it per call and never
/// call each other; only the bridge orders them. Calls are never retried and a failed step is
/// never compensated.
pub struct Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Store holding one access token per user.
	pub store: Arc<dyn TokenStore>,
	/// Immutable bridge configuration.
	pub config: Arc<BridgeConfig>,
}
impl<C> Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a bridge over the caller-provided transport.
	pub fn with_http_client(
		config: impl Into<Arc<BridgeConfig>>,
		store: Arc<dyn TokenStore>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { http_client: http_client.into(), store, config: config.into() }
	}

	/// Exchanger bound to this bridge's transport and configuration.
	pub fn exchanger(&self) -> OAuthExchanger<'_, C> {
		OAuthExchanger::new(self.http_client.as_ref(), &self.config)
	}

	/// Registrar bound to this bridge's transport and configuration.
	pub fn registrar(&self) -> UserRegistrar<'_, C> {
		UserRegistrar::new(self.http_client.as_ref(), &self.config)
	}

	/// Resource fetcher bound to this bridge's transport, store, and configuration.
	pub fn fetcher(&self) -> ResourceFetcher<'_, C> {
		ResourceFetcher::new(self.http_client.as_ref(), self.store.as_ref(), &self.config)
	}

	/// Authorization URL the end user should be redirected to; see
	/// [`crate::oauth::authorization_url`].
	pub fn begin_authorization(&self, state: Option<&str>) -> Url {
		self.exchanger().authorization_url(state)
	}
}
#[cfg(feature = "reqwest")]
impl Bridge<ReqwestHttpClient> {
	/// Creates a bridge with a default reqwest transport (no timeout, redirects disabled).
	pub fn new(
		config: impl Into<Arc<BridgeConfig>>,
		store: Arc<dyn TokenStore>,
	) -> Result<Self> {
		let http_client = ReqwestHttpClient::new(None)?;

		Ok(Self::with_http_client(config, store, http_client))
	}
}
impl<C> Clone for Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
		}
	}
}
impl<C> Debug for Bridge<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Bridge")
			.field("client_id", &self.config.credentials.client_id.as_str())
			.field("redirect_uri", &self.config.redirect_uri.as_str())
			.field("descriptor", &self.config.descriptor)
			.finish_non_exhaustive()
	}
}
