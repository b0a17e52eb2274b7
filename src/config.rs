//! Immutable bridge configuration, built once at startup and shared by reference.
//!
//! [`BridgeConfig`] carries everything the core flows need (client credentials, the fixed
//! redirect URI, and provider endpoints). With the `server` feature, [`Settings`] parses the
//! process configuration from flags or environment variables; missing required values abort
//! startup instead of failing individual requests.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{ClientId, ClientSecret};
// self
use crate::{_prelude::*, provider::ProviderDescriptor};

/// OAuth client credentials issued by the provider.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// Public client identifier.
	pub client_id: ClientId,
	/// Confidential client secret (redacted in `Debug`).
	pub client_secret: ClientSecret,
}
impl ClientCredentials {
	/// Wraps the provided identifier and secret.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: ClientId::new(client_id.into()),
			client_secret: ClientSecret::new(client_secret.into()),
		}
	}

	/// `Authorization` header value for the token endpoint: `Basic base64(id:secret)`.
	pub fn basic_auth_header(&self) -> String {
		let raw = format!("{}:{}", self.client_id.as_str(), self.client_secret.secret());

		format!("Basic {}", STANDARD.encode(raw))
	}
}

/// Everything the bridge flows read; never mutated after construction.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
	/// Client credentials used for the code exchange.
	pub credentials: ClientCredentials,
	/// Redirect URI registered with the provider.
	pub redirect_uri: Url,
	/// Provider endpoints.
	pub descriptor: ProviderDescriptor,
}
impl BridgeConfig {
	/// Bundles credentials, redirect URI, and endpoints.
	pub fn new(credentials: ClientCredentials, redirect_uri: Url, descriptor: ProviderDescriptor) -> Self {
		Self { credentials, redirect_uri, descriptor }
	}
}

#[cfg(feature = "server")]
pub use settings::Settings;

#[cfg(feature = "server")]
mod settings {
	// std
	use std::net::SocketAddr;
	// crates.io
	use clap::Parser;
	// self
	use super::*;
	use crate::{
		error::ConfigError,
		provider::{
			POLAR_AUTHORIZATION_ENDPOINT, POLAR_TOKEN_ENDPOINT, POLAR_USERS_ENDPOINT,
		},
	};

	/// Process configuration for the bridge server.
	#[derive(Clone, Parser)]
	#[command(name = "polar-oauth-bridge", version, about = "Polar AccessLink OAuth 2.0 bridge.")]
	pub struct Settings {
		/// Polar client identifier.
		#[arg(long, env = "CLIENT_ID")]
		pub client_id: String,
		/// Polar client secret.
		#[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
		pub client_secret: String,
		/// Redirect URI registered in the Polar admin console.
		#[arg(long, env = "REDIRECT_URI")]
		pub redirect_uri: Url,
		/// Connection string of the Redis token store.
		#[arg(long, env = "REDIS_URL", hide_env_values = true)]
		pub store_url: String,
		/// Address the HTTP server listens on.
		#[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
		pub bind: SocketAddr,
		/// Timeout applied to every provider call, in seconds.
		#[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 30)]
		pub http_timeout_secs: u64,
		/// Authorization endpoint override.
		#[arg(long, env = "POLAR_AUTHORIZATION_ENDPOINT", default_value = POLAR_AUTHORIZATION_ENDPOINT)]
		pub authorization_endpoint: Url,
		/// Token endpoint override.
		#[arg(long, env = "POLAR_TOKEN_ENDPOINT", default_value = POLAR_TOKEN_ENDPOINT)]
		pub token_endpoint: Url,
		/// AccessLink users endpoint override.
		#[arg(long, env = "POLAR_USERS_ENDPOINT", default_value = POLAR_USERS_ENDPOINT)]
		pub users_endpoint: Url,
	}
	impl Settings {
		/// Validates the settings and builds the bridge configuration.
		pub fn bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
			if self.client_id.is_empty() {
				return Err(ConfigError::EmptyClientId);
			}

			let descriptor = ProviderDescriptor::builder()
				.authorization_endpoint(self.authorization_endpoint.clone())
				.token_endpoint(self.token_endpoint.clone())
				.users_endpoint(self.users_endpoint.clone())
				.build()?;

			Ok(BridgeConfig::new(
				ClientCredentials::new(&self.client_id, &self.client_secret),
				self.redirect_uri.clone(),
				descriptor,
			))
		}

		/// Provider call timeout.
		pub fn http_timeout(&self) -> std::time::Duration {
			std::time::Duration::from_secs(self.http_timeout_secs)
		}
	}
	impl Debug for Settings {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("Settings")
				.field("client_id", &self.client_id)
				.field("client_secret", &"<redacted>")
				.field("redirect_uri", &self.redirect_uri.as_str())
				.field("store_url", &"<redacted>")
				.field("bind", &self.bind)
				.field("http_timeout_secs", &self.http_timeout_secs)
				.field("authorization_endpoint", &self.authorization_endpoint.as_str())
				.field("token_endpoint", &self.token_endpoint.as_str())
				.field("users_endpoint", &self.users_endpoint.as_str())
				.finish()
		}
	}

}
