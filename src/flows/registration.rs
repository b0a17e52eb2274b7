//! Member registration with the AccessLink users endpoint.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserId},
	config::BridgeConfig,
	http::{self, ProviderHttpClient},
};

/// Successful registration results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegistrationOutcome {
	/// The provider created the membership (2xx).
	Registered,
	/// The provider already knew the member (409).
	AlreadyRegistered,
}
impl RegistrationOutcome {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Registered => "registered",
			Self::AlreadyRegistered => "already_registered",
		}
	}
}

/// Registers users with the provider under their own access token.
pub struct UserRegistrar<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	http_client: &'a C,
	config: &'a BridgeConfig,
}
impl<'a, C> UserRegistrar<'a, C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a registrar over the provided transport and configuration.
	pub fn new(http_client: &'a C, config: &'a BridgeConfig) -> Self {
		Self { http_client, config }
	}

	/// Posts `{"member-id": <user_id>}` with `Authorization: Bearer <access_token>`.
	///
	/// A 409 conflict means the member exists and counts as success. Any other non-2xx status
	/// or a transport failure yields [`Error::Registration`].
	pub async fn register(
		&self,
		access_token: &AccessToken,
		user_id: &UserId,
	) -> Result<RegistrationOutcome> {
		let body = serde_json::json!({ "member-id": user_id.as_str() }).to_string().into_bytes();
		let request = http::json_post(
			self.config.descriptor.registration_url(),
			&access_token.bearer_header(),
			body,
		)
		.map_err(|e| Error::Registration(e.into()))?;
		let response = http::send(self.http_client, request).await.map_err(Error::Registration)?;

		match response.status {
			409 => Ok(RegistrationOutcome::AlreadyRegistered),
			_ if response.is_success() => Ok(RegistrationOutcome::Registered),
			_ => Err(Error::Registration(response.into_status_error())),
		}
	}
}
