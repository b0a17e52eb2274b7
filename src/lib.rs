//! OAuth 2.0 authorization-code bridge for Polar AccessLink.
//!
//! The bridge exchanges authorization codes under the client credentials and keeps each user's
//! access token in a TTL-aware store. It registers the user with AccessLink and later fetches
//! their physical information with Bearer-authorized calls.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod reply;
#[cfg(feature = "server")] pub mod server;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::{BridgeConfig, ClientCredentials},
		flows::Bridge,
		http::ReqwestHttpClient,
		provider::ProviderDescriptor,
		store::{ManualClock, MemoryStore, TokenStore},
	};

	/// Bridge type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBridge = Bridge<ReqwestHttpClient>;

	/// Client identifier shared by test fixtures.
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Client secret shared by test fixtures.
	pub const TEST_CLIENT_SECRET: &str = "secret-it";
	/// Redirect URI shared by test fixtures.
	pub const TEST_REDIRECT_URI: &str = "http://localhost:3000/auth/callback";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Describes a provider whose endpoints all live under `base` (typically a mock server).
	pub fn test_descriptor(base: &str) -> ProviderDescriptor {
		let endpoint = |path: &str| {
			Url::parse(&format!("{}{path}", base.trim_end_matches('/')))
				.expect("Failed to parse mock provider endpoint.")
		};

		ProviderDescriptor::builder()
			.authorization_endpoint(endpoint("/oauth2/authorization"))
			.token_endpoint(endpoint("/v2/oauth2/token"))
			.users_endpoint(endpoint("/v3/users"))
			.build()
			.expect("Mock provider descriptor should build successfully.")
	}

	/// Builds the bridge configuration used across integration tests.
	pub fn test_config(base: &str) -> BridgeConfig {
		BridgeConfig::new(
			ClientCredentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET),
			Url::parse(TEST_REDIRECT_URI).expect("Failed to parse test redirect URI."),
			test_descriptor(base),
		)
	}

	/// Constructs a [`Bridge`] backed by an in-memory store, a manual clock, and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_bridge(
		config: BridgeConfig,
	) -> (ReqwestTestBridge, Arc<MemoryStore>, ManualClock) {
		let clock = ManualClock::default();
		let store_backend = Arc::new(MemoryStore::with_clock(clock.clone()));
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let bridge = Bridge::with_http_client(config, store, test_reqwest_http_client());

		(bridge, store_backend, clock)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "server")] use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _, tower as _};
