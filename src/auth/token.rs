//! AccessLink access tokens.

// self
use crate::_prelude::*;

/// Bearer token issued by the AccessLink token endpoint.
///
/// Formatting never prints the token; only [`AccessToken::expose`] and
/// [`AccessToken::bearer_header`] hand out the raw value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a token value as returned by the provider or read back from the store.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw token value, used for storage and the success page.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `Authorization` header value for AccessLink resource calls.
	pub fn bearer_header(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AccessToken(<{} bytes>)", self.0.len())
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<access token>")
	}
}
