//! Access token grants produced by the authorization-code exchange.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, UserId},
};

/// Access token issued to a single provider user.
///
/// Polar issues no refresh token; once `expires_in` elapses the user has to authorize again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenGrant {
	/// Bearer credential for the user's resources.
	pub access_token: AccessToken,
	/// Provider user the token belongs to.
	pub user_id: UserId,
	/// Lifetime declared by the provider, if any.
	pub expires_in: Option<Duration>,
}
impl TokenGrant {
	/// Creates a grant without a declared lifetime.
	pub fn new(access_token: impl Into<String>, user_id: UserId) -> Self {
		Self { access_token: AccessToken::new(access_token), user_id, expires_in: None }
	}

	/// Sets the provider-declared lifetime. Non-positive values mean "no expiry".
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_in = expires_in.is_positive().then_some(expires_in);

		self
	}
}
